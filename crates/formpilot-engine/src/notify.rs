use crate::document::Document;
use async_trait::async_trait;
use formpilot_common::error::DomError;
use formpilot_common::protocol::{ElementId, Notice, SolverResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Receives the outcome of every dispatched run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, result: &SolverResult) -> Result<(), DomError>;
}

/// Logs the outcome as a structured event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, result: &SolverResult) -> Result<(), DomError> {
        if result.success {
            info!(success = true, "{}", result.message);
        } else {
            warn!(success = false, "{}", result.message);
        }
        Ok(())
    }
}

pub const NOTICE_CSS: &str = r#"
@keyframes formpilot-slide-in {
  from { transform: translateX(400px); opacity: 0; }
  to { transform: translateX(0); opacity: 1; }
}
@keyframes formpilot-slide-out {
  from { transform: translateX(0); opacity: 1; }
  to { transform: translateX(400px); opacity: 0; }
}
.formpilot-notice {
  position: fixed;
  top: 20px;
  right: 20px;
  padding: 15px 20px;
  color: white;
  border-radius: 6px;
  box-shadow: 0 4px 12px rgba(0, 0, 0, 0.3);
  z-index: 999999;
  font-family: 'Segoe UI', Arial, sans-serif;
  font-size: 14px;
  max-width: 300px;
  animation: formpilot-slide-in 0.3s ease-out;
}
.formpilot-notice--success { background-color: #4CAF50; }
.formpilot-notice--error { background-color: #f44336; }
.formpilot-notice--leaving { animation: formpilot-slide-out 0.3s ease-in; }
"#;

/// Shows each result as a self-dismissing overlay on the page.
///
/// The overlay stylesheet is a page resource owned by this notifier: it is
/// inserted once by [`install`](Self::install) and removed by
/// [`uninstall`](Self::uninstall).
pub struct OverlayNotifier<D: Document> {
    document: D,
    dismiss_after_ms: u64,
    style: Mutex<Option<ElementId>>,
}

impl<D: Document> OverlayNotifier<D> {
    pub fn new(document: D, dismiss_after_ms: u64) -> Self {
        Self {
            document,
            dismiss_after_ms,
            style: Mutex::new(None),
        }
    }

    /// Insert the overlay stylesheet. Further calls reuse the existing one.
    pub async fn install(&self) -> Result<ElementId, DomError> {
        let mut style = self.style.lock().await;
        if let Some(existing) = *style {
            return Ok(existing);
        }
        let element = self.document.insert_style(NOTICE_CSS).await?;
        debug!("Installed overlay style {}", element);
        *style = Some(element);
        Ok(element)
    }

    /// Remove the stylesheet, if installed.
    pub async fn uninstall(&self) -> Result<(), DomError> {
        let Some(element) = self.style.lock().await.take() else {
            return Ok(());
        };
        self.document.remove(element).await
    }
}

#[async_trait]
impl<D: Document> Notifier for OverlayNotifier<D> {
    async fn notify(&self, result: &SolverResult) -> Result<(), DomError> {
        self.install().await?;
        let notice = Notice::for_result(result, self.dismiss_after_ms);
        self.document.show_notice(&notice).await?;
        Ok(())
    }
}
