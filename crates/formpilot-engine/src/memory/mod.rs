//! In-process document used by tests and rehearsal runs.
//!
//! `MemoryDocument` keeps an element tree behind a mutex, broadcasts a
//! mutation batch on every structural change, records every dispatched event
//! with the target's value at dispatch time, and lets callers attach page
//! behaviour as event listeners.

pub mod selector;
pub mod tree;

use crate::document::{Document, MutationSubscription};
use async_trait::async_trait;
use formpilot_common::error::DomError;
use formpilot_common::protocol::{DomEvent, ElementId, MutationBatch, Notice, NoticeKind};
use selector::{SelectorError, SelectorList, parse_selector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
pub use tree::{DomTree, ElementSpec};

const MUTATION_CHANNEL_CAPACITY: usize = 64;

/// Delay between a notice's dismissal and its removal (exit animation).
const NOTICE_EXIT: Duration = Duration::from_millis(300);

/// One event as observed by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: ElementId,
    pub event: DomEvent,
    /// The target's value at the moment the event was dispatched.
    pub value: String,
}

/// Page behaviour hook, run after each dispatched event.
pub type Listener = Arc<dyn Fn(&MemoryDocument, &DispatchedEvent) + Send + Sync>;

struct Shared {
    tree: Mutex<DomTree>,
    journal: Mutex<Vec<DispatchedEvent>>,
    listeners: Mutex<Vec<Listener>>,
    mutations: broadcast::Sender<MutationBatch>,
    observers: AtomicUsize,
}

/// Cheaply cloneable handle; clones share the same document.
#[derive(Clone)]
pub struct MemoryDocument {
    shared: Arc<Shared>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("observers", &self.active_observers())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn compile_selector(input: &str) -> Result<SelectorList, DomError> {
    parse_selector(input).map_err(|e: SelectorError| DomError::InvalidSelector {
        selector: input.to_string(),
        reason: e.to_string(),
    })
}

impl MemoryDocument {
    pub fn new() -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                tree: Mutex::new(DomTree::new()),
                journal: Mutex::new(Vec::new()),
                listeners: Mutex::new(Vec::new()),
                mutations,
                observers: AtomicUsize::new(0),
            }),
        }
    }

    pub fn body(&self) -> ElementId {
        lock(&self.shared.tree).body()
    }

    // ============================================================
    // Structural changes (each reports one mutation batch)
    // ============================================================

    pub fn append(&self, parent: ElementId, spec: ElementSpec) -> Result<ElementId, DomError> {
        let element = lock(&self.shared.tree).append(parent, spec)?;
        self.report_mutation(1);
        Ok(element)
    }

    pub fn append_to_body(&self, spec: ElementSpec) -> ElementId {
        let element = lock(&self.shared.tree).append_to_body(spec);
        self.report_mutation(1);
        element
    }

    pub fn detach(&self, element: ElementId) -> Result<(), DomError> {
        lock(&self.shared.tree).remove(element)?;
        self.report_mutation(1);
        Ok(())
    }

    pub fn set_attribute(&self, element: ElementId, name: &str, value: &str) -> Result<(), DomError> {
        lock(&self.shared.tree).set_attribute(element, name, value)?;
        self.report_mutation(1);
        Ok(())
    }

    pub fn set_text(&self, element: ElementId, text: &str) -> Result<(), DomError> {
        lock(&self.shared.tree).set_text(element, text)?;
        self.report_mutation(1);
        Ok(())
    }

    fn report_mutation(&self, records: usize) {
        // No receivers just means nobody is observing.
        let _ = self.shared.mutations.send(MutationBatch { records });
    }

    // ============================================================
    // Page behaviour
    // ============================================================

    /// Registers a listener that runs after every dispatched event and click.
    pub fn on_event<F>(&self, listener: F)
    where
        F: Fn(&MemoryDocument, &DispatchedEvent) + Send + Sync + 'static,
    {
        lock(&self.shared.listeners).push(Arc::new(listener));
    }

    fn record(&self, target: ElementId, event: DomEvent) -> Result<(), DomError> {
        let value = lock(&self.shared.tree).value(target)?.to_string();
        let dispatched = DispatchedEvent {
            target,
            event,
            value,
        };
        lock(&self.shared.journal).push(dispatched.clone());

        let listeners: Vec<Listener> = lock(&self.shared.listeners).clone();
        for listener in listeners {
            listener(self, &dispatched);
        }
        Ok(())
    }

    // ============================================================
    // Inspection
    // ============================================================

    pub fn find(&self, selector_text: &str) -> Result<Option<ElementId>, DomError> {
        let selector = compile_selector(selector_text)?;
        Ok(lock(&self.shared.tree).query(&selector))
    }

    /// Value of the first element matching the selector.
    pub fn value_of(&self, selector_text: &str) -> Option<String> {
        let element = self.find(selector_text).ok()??;
        lock(&self.shared.tree)
            .value(element)
            .ok()
            .map(str::to_string)
    }

    pub fn attribute_of(&self, element: ElementId, name: &str) -> Option<String> {
        lock(&self.shared.tree)
            .attribute(element, name)
            .ok()
            .flatten()
            .map(str::to_string)
    }

    pub fn text_of(&self, element: ElementId) -> Option<String> {
        lock(&self.shared.tree).inner_text(element).ok()
    }

    /// Every event dispatched so far, in order.
    pub fn events(&self) -> Vec<DispatchedEvent> {
        lock(&self.shared.journal).clone()
    }

    pub fn events_for(&self, element: ElementId) -> Vec<DispatchedEvent> {
        lock(&self.shared.journal)
            .iter()
            .filter(|e| e.target == element)
            .cloned()
            .collect()
    }

    pub fn focused(&self) -> Option<ElementId> {
        lock(&self.shared.tree).focused()
    }

    /// Number of mutation subscriptions not yet disconnected or dropped.
    pub fn active_observers(&self) -> usize {
        self.shared.observers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Document for MemoryDocument {
    async fn query_selector(&self, selector_text: &str) -> Result<Option<ElementId>, DomError> {
        self.find(selector_text)
    }

    async fn query_selector_all(&self, selector_text: &str) -> Result<Vec<ElementId>, DomError> {
        let selector = compile_selector(selector_text)?;
        Ok(lock(&self.shared.tree).query_all(&selector))
    }

    async fn value(&self, element: ElementId) -> Result<String, DomError> {
        lock(&self.shared.tree).value(element).map(str::to_string)
    }

    async fn set_value(&self, element: ElementId, value: &str) -> Result<(), DomError> {
        lock(&self.shared.tree).set_value(element, value)
    }

    async fn inner_text(&self, element: ElementId) -> Result<String, DomError> {
        lock(&self.shared.tree).inner_text(element)
    }

    async fn dispatch_event(
        &self,
        element: ElementId,
        event: &DomEvent,
    ) -> Result<bool, DomError> {
        self.record(element, event.clone())?;
        Ok(true)
    }

    async fn focus(&self, element: ElementId) -> Result<(), DomError> {
        lock(&self.shared.tree).focus(element)
    }

    async fn click(&self, element: ElementId) -> Result<(), DomError> {
        self.record(element, DomEvent::primary_click())
    }

    async fn scroll_into_view(&self, element: ElementId) -> Result<(), DomError> {
        lock(&self.shared.tree).tag(element).map(|_| ())
    }

    async fn observe_mutations(&self) -> Result<Box<dyn MutationSubscription>, DomError> {
        let receiver = self.shared.mutations.subscribe();
        self.shared.observers.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySubscription {
            receiver,
            shared: Arc::clone(&self.shared),
            released: false,
        }))
    }

    async fn insert_style(&self, css: &str) -> Result<ElementId, DomError> {
        Ok(self.append_to_body(ElementSpec::new("style").text(css)))
    }

    async fn show_notice(&self, notice: &Notice) -> Result<ElementId, DomError> {
        let kind = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        let element = self.append_to_body(
            ElementSpec::new("div")
                .class("formpilot-notice")
                .class(&format!("formpilot-notice--{}", kind))
                .text(&notice.message),
        );

        let document = self.clone();
        let linger = Duration::from_millis(notice.dismiss_after_ms) + NOTICE_EXIT;
        tokio::spawn(async move {
            tokio::time::sleep(linger).await;
            // Already gone if the caller removed it first.
            let _ = document.detach(element);
        });
        Ok(element)
    }

    async fn remove(&self, element: ElementId) -> Result<(), DomError> {
        self.detach(element)
    }
}

struct MemorySubscription {
    receiver: broadcast::Receiver<MutationBatch>,
    shared: Arc<Shared>,
    released: bool,
}

impl MemorySubscription {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.shared.observers.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl MutationSubscription for MemorySubscription {
    async fn next_batch(&mut self) -> Option<MutationBatch> {
        match self.receiver.recv().await {
            Ok(batch) => Some(batch),
            // Missed batches still mean the tree changed.
            Err(broadcast::error::RecvError::Lagged(skipped)) => Some(MutationBatch {
                records: skipped as usize,
            }),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    async fn disconnect(mut self: Box<Self>) -> Result<(), DomError> {
        self.release();
        Ok(())
    }
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_records_value_and_runs_listeners() {
        let doc = MemoryDocument::new();
        let input = doc.append_to_body(ElementSpec::new("input").id("city"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        doc.on_event(move |_, event| {
            lock(&sink).push(event.event.event_type().to_string());
        });

        doc.set_value(input, "Ist").await.unwrap();
        doc.dispatch_event(input, &DomEvent::insert_text('t'))
            .await
            .unwrap();
        doc.click(input).await.unwrap();

        let events = doc.events_for(input);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value, "Ist");
        assert_eq!(*lock(&seen), vec!["input", "click"]);
    }

    #[tokio::test]
    async fn test_subscription_sees_structural_changes() {
        let doc = MemoryDocument::new();
        let mut subscription = doc.observe_mutations().await.unwrap();
        assert_eq!(doc.active_observers(), 1);

        doc.append_to_body(ElementSpec::new("div"));
        let batch = subscription.next_batch().await.unwrap();
        assert_eq!(batch.records, 1);

        subscription.disconnect().await.unwrap();
        assert_eq!(doc.active_observers(), 0);
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_released() {
        let doc = MemoryDocument::new();
        {
            let _subscription = doc.observe_mutations().await.unwrap();
            assert_eq!(doc.active_observers(), 1);
        }
        assert_eq!(doc.active_observers(), 0);
    }

    #[tokio::test]
    async fn test_value_writes_are_not_mutations() {
        let doc = MemoryDocument::new();
        let input = doc.append_to_body(ElementSpec::new("input"));
        let mut subscription = doc.observe_mutations().await.unwrap();

        doc.set_value(input, "John").await.unwrap();
        let pending = tokio::time::timeout(Duration::from_millis(10), subscription.next_batch()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_invalid_selector_is_reported() {
        let doc = MemoryDocument::new();
        let err = doc.query_selector("input[").await.unwrap_err();
        assert!(matches!(err, DomError::InvalidSelector { selector: s, .. } if s == "input["));
    }
}
