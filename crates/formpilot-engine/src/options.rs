use crate::document::Document;
use crate::observe::{Probe, watch_for};
use async_trait::async_trait;
use formpilot_common::error::DomError;
use formpilot_common::protocol::ElementId;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// A rendered dropdown entry. The page owns the element; we only read and click it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionCandidate {
    pub element: ElementId,
    pub text: String,
}

struct OptionTextProbe<'a> {
    locator: &'a str,
    text: &'a str,
}

#[async_trait]
impl Probe for OptionTextProbe<'_> {
    type Output = OptionCandidate;

    async fn probe(&self, document: &dyn Document) -> Result<Option<OptionCandidate>, DomError> {
        for element in document.query_selector_all(self.locator).await? {
            match document.inner_text(element).await {
                Ok(text) if text.contains(self.text) => {
                    return Ok(Some(OptionCandidate { element, text }));
                }
                Ok(_) => {}
                // The menu re-rendered under us; the next batch will rescan.
                Err(DomError::StaleElement { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// First option (document order) whose visible text contains `match_text`.
///
/// Resolves to `Ok(None)` when nothing matches by the deadline; deciding
/// whether that is fatal is up to the caller.
pub async fn find_option(
    document: &dyn Document,
    option_locator: &str,
    match_text: &str,
    timeout: Duration,
) -> Result<Option<OptionCandidate>, DomError> {
    let probe = OptionTextProbe {
        locator: option_locator,
        text: match_text,
    };
    let found = watch_for(document, &probe, timeout).await?;
    if found.is_none() {
        debug!(
            "No {} containing {:?} within {:?}",
            option_locator, match_text, timeout
        );
    }
    Ok(found)
}
