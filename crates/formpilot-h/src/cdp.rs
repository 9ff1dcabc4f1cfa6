use crate::session::{LaunchOptions, SessionError};
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    user_data_dir: PathBuf,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, SessionError> {
        let mut config_builder = BrowserConfig::builder();
        config_builder = config_builder.no_sandbox();
        let (user_data_dir, cleanup_user_data_dir) =
            resolve_user_data_dir(options.user_data_dir.as_ref())?;
        config_builder = config_builder.user_data_dir(&user_data_dir);

        if options.visible {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        } else {
            tracing::info!("Launching browser in headless mode");
        }

        if let Some(chrome) = resolve_chrome_executable(options.chrome_executable.as_ref()) {
            tracing::info!("Using custom Chrome binary: {}", chrome.display());
            config_builder = config_builder.chrome_executable(chrome);
        }

        let config = config_builder.build().map_err(SessionError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    tracing::error!("Browser handler error (ignoring): {}", e);
                    continue;
                }
            }
            tracing::info!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Launch(format!("Failed to create page: {}", e)))?;

        forward_console(&page).await?;
        accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            handler_task,
            page,
            user_data_dir,
            cleanup_user_data_dir,
        })
    }

    pub async fn close(mut self) -> Result<(), SessionError> {
        self.browser
            .close()
            .await
            .map_err(|e| SessionError::Browser(format!("Error closing browser: {}", e)))?;
        self.handler_task
            .await
            .map_err(|e| SessionError::Browser(format!("Error awaiting handler: {}", e)))?;

        if self.cleanup_user_data_dir
            && let Err(e) = std::fs::remove_dir_all(&self.user_data_dir)
        {
            tracing::debug!(
                "Failed to clean up user-data-dir {}: {}",
                self.user_data_dir.display(),
                e
            );
        }

        Ok(())
    }
}

async fn forward_console(page: &Page) -> Result<(), SessionError> {
    let mut console_events = page
        .event_listener::<EventConsoleApiCalled>()
        .await
        .map_err(|e| SessionError::Browser(format!("Failed to subscribe to console events: {}", e)))?;

    tokio::spawn(async move {
        while let Some(event) = console_events.next().await {
            let args: Vec<String> = event
                .args
                .iter()
                .map(|arg| {
                    arg.description
                        .clone()
                        .or_else(|| arg.value.as_ref().map(|v| v.to_string()))
                        .unwrap_or_else(|| "unknown".to_string())
                })
                .collect();
            tracing::debug!("Browser Console [{:?}]: {}", event.r#type, args.join(" "));
        }
    });
    Ok(())
}

/// Alerts and confirms would block every evaluation, so accept them as they open.
async fn accept_dialogs(page: &Page) -> Result<(), SessionError> {
    let mut dialog_events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .map_err(|e| SessionError::Browser(format!("Failed to subscribe to dialog events: {}", e)))?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = dialog_events.next().await {
            tracing::info!(
                "Handling JavaScript Dialog: {} ({:?})",
                event.message,
                event.r#type
            );
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                tracing::error!("Failed to handle/accept dialog: {}", e);
            }
        }
    });
    Ok(())
}

fn resolve_chrome_executable(configured: Option<&PathBuf>) -> Option<PathBuf> {
    configured
        .cloned()
        .or_else(|| std::env::var_os("CHROME_BIN").map(PathBuf::from))
}

fn resolve_user_data_dir(configured: Option<&PathBuf>) -> Result<(PathBuf, bool), SessionError> {
    let persistent = configured
        .cloned()
        .or_else(|| std::env::var_os("FORMPILOT_USER_DATA_DIR").map(PathBuf::from));
    if let Some(path) = persistent {
        std::fs::create_dir_all(&path)?;
        tracing::info!("Using user data dir: {}", path.display());
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SessionError::Launch(format!("System clock error: {}", e)))?
        .as_nanos();
    let unique = format!("formpilot-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path)?;
    tracing::info!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}
