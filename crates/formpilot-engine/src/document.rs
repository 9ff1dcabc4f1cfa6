use async_trait::async_trait;
pub use formpilot_common::error::DomError;
use formpilot_common::protocol::{DomEvent, ElementId, MutationBatch, Notice};

/// The Document trait is the only surface the automation core touches.
///
/// Implementations must serialize their own access; the engine never issues
/// two operations concurrently against the same document.
#[async_trait]
pub trait Document: Send + Sync {
    /// First element in document order matching the selector.
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, DomError>;

    /// All elements matching the selector, in document order.
    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, DomError>;

    /// Current value of a form control (empty for elements without one).
    async fn value(&self, element: ElementId) -> Result<String, DomError>;

    async fn set_value(&self, element: ElementId, value: &str) -> Result<(), DomError>;

    /// Rendered text of the element and its descendants.
    async fn inner_text(&self, element: ElementId) -> Result<String, DomError>;

    /// Dispatch a synthetic event. Returns `false` if a listener cancelled it.
    async fn dispatch_event(&self, element: ElementId, event: &DomEvent)
    -> Result<bool, DomError>;

    async fn focus(&self, element: ElementId) -> Result<(), DomError>;

    /// Primary-button click, including the page's default activation behaviour.
    async fn click(&self, element: ElementId) -> Result<(), DomError>;

    async fn scroll_into_view(&self, element: ElementId) -> Result<(), DomError>;

    /// Subscribe to tree mutation batches.
    ///
    /// The subscription stays live until `disconnect` is awaited or it is dropped.
    async fn observe_mutations(&self) -> Result<Box<dyn MutationSubscription>, DomError>;

    /// Attach a stylesheet to the page. Returns a handle for later removal.
    async fn insert_style(&self, _css: &str) -> Result<ElementId, DomError> {
        Err(DomError::NotSupported("insert_style".into()))
    }

    /// Show an overlay message that dismisses itself.
    async fn show_notice(&self, _notice: &Notice) -> Result<ElementId, DomError> {
        Err(DomError::NotSupported("show_notice".into()))
    }

    /// Detach an element from the document.
    async fn remove(&self, _element: ElementId) -> Result<(), DomError> {
        Err(DomError::NotSupported("remove".into()))
    }
}

/// A live mutation-observer registration.
#[async_trait]
pub trait MutationSubscription: Send {
    /// Wait for the next batch. `None` means the document will never report again.
    async fn next_batch(&mut self) -> Option<MutationBatch>;

    /// Tear down the observer.
    async fn disconnect(self: Box<Self>) -> Result<(), DomError>;
}
