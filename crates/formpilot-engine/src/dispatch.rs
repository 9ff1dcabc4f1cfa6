use crate::config::Timings;
use crate::document::Document;
use crate::engine::FormAutomationEngine;
use crate::notify::Notifier;
use crate::profile::ProfileRegistry;
use formpilot_common::protocol::SolverResult;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

/// Looks up profiles by id and runs them.
pub struct Dispatcher {
    registry: ProfileRegistry,
    timings: Timings,
}

impl Dispatcher {
    pub fn new(registry: ProfileRegistry, timings: Timings) -> Self {
        Self { registry, timings }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn engine_for(&self, profile_id: &str) -> Result<FormAutomationEngine<'_>, DispatchError> {
        let profile = self.registry.resolve(profile_id)?;
        Ok(FormAutomationEngine::new(profile, &self.timings))
    }

    /// Run a profile and hand the result to the notifier.
    ///
    /// An unknown id fails before the document is touched. Notifier failures
    /// are logged and never change the result.
    pub async fn dispatch(
        &self,
        profile_id: &str,
        document: &dyn Document,
        notifier: &dyn Notifier,
    ) -> Result<SolverResult, DispatchError> {
        let engine = self.engine_for(profile_id)?;
        let result = engine.run(document).await;
        if let Err(e) = notifier.notify(&result).await {
            warn!("Failed to report result for {}: {}", profile_id, e);
        }
        Ok(result)
    }
}
