use async_trait::async_trait;
use formpilot_engine::config::Timings;
use formpilot_engine::dispatch::{DispatchError, Dispatcher};
use formpilot_engine::error::DomError;
use formpilot_engine::memory::MemoryDocument;
use formpilot_engine::notify::{Notifier, TracingNotifier};
use formpilot_engine::profile::ProfileRegistry;
use formpilot_engine::protocol::SolverResult;
use std::sync::Mutex;

#[derive(Default)]
struct RecordingNotifier {
    results: Mutex<Vec<SolverResult>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, result: &SolverResult) -> Result<(), DomError> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _result: &SolverResult) -> Result<(), DomError> {
        Err(DomError::NotSupported("show_notice".into()))
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ProfileRegistry::with_builtins(), Timings::default())
}

#[tokio::test(start_paused = true)]
async fn test_unknown_profile_is_rejected_before_running() {
    let doc = MemoryDocument::new();
    let notifier = RecordingNotifier::default();

    let err = dispatcher()
        .dispatch("solveProblem9", &doc, &notifier)
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::UnknownProfile(ref id) if id == "solveProblem9"));
    assert_eq!(err.to_string(), "Unknown profile: solveProblem9");
    assert!(notifier.results.lock().unwrap().is_empty());
    assert_eq!(doc.active_observers(), 0);
    assert!(doc.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_result_is_handed_to_notifier() {
    let doc = MemoryDocument::new();
    let notifier = RecordingNotifier::default();

    let result = dispatcher()
        .dispatch("greenhouse-calendly", &doc, &notifier)
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(*notifier.results.lock().unwrap(), vec![result]);
}

#[tokio::test(start_paused = true)]
async fn test_notifier_failure_does_not_change_result() {
    let doc = MemoryDocument::new();

    let result = dispatcher()
        .dispatch("greenhouse-calendly", &doc, &FailingNotifier)
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.message.starts_with("Error: Element not found"));
}

#[tokio::test(start_paused = true)]
async fn test_tracing_notifier_accepts_any_result() {
    let notifier = TracingNotifier;
    assert!(notifier.notify(&SolverResult::succeeded("done")).await.is_ok());
    assert!(notifier.notify(&SolverResult::failed("Error: x")).await.is_ok());
}
