use crate::document::Document;
use crate::observe::{Probe, watch_for};
use async_trait::async_trait;
use formpilot_common::error::{AutomationError, DomError};
use formpilot_common::protocol::{ElementId, TargetDescriptor};
use std::time::Duration;
use tracing::{debug, info};

struct SelectorProbe<'a> {
    selector: &'a str,
}

#[async_trait]
impl Probe for SelectorProbe<'_> {
    type Output = ElementId;

    async fn probe(&self, document: &dyn Document) -> Result<Option<ElementId>, DomError> {
        document.query_selector(self.selector).await
    }
}

/// Wait until an element matching the target exists.
///
/// Returns immediately when it is already present. Otherwise fails with
/// [`AutomationError::NotFound`] once `timeout` has elapsed, never earlier.
pub async fn wait_for(
    document: &dyn Document,
    target: &TargetDescriptor,
    timeout: Duration,
) -> Result<ElementId, AutomationError> {
    debug!("Waiting up to {:?} for {}", timeout, target.locator);
    let probe = SelectorProbe {
        selector: &target.locator,
    };
    match watch_for(document, &probe, timeout).await? {
        Some(element) => {
            info!("Found {} ({})", target.locator, element);
            Ok(element)
        }
        None => Err(AutomationError::not_found(&target.locator)),
    }
}
