use crate::inject::process;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::listeners::EventStream;
use formpilot_engine::document::{Document, MutationSubscription};
use formpilot_engine::error::DomError;
use formpilot_engine::protocol::{
    DomEvent, ElementId, MutationBatch, MutationReport, Notice, PageRequest,
};
use formpilot_scanner::MUTATION_BINDING;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// A live Chromium page, driven through the injected page runtime.
#[derive(Clone)]
pub struct CdpDocument {
    page: Page,
    binding: Arc<OnceCell<()>>,
}

impl CdpDocument {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            binding: Arc::new(OnceCell::new()),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn request<T: DeserializeOwned>(&self, request: PageRequest) -> Result<T, DomError> {
        let value = process(&self.page, &request).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn request_unit(&self, request: PageRequest) -> Result<(), DomError> {
        process(&self.page, &request).await.map(|_| ())
    }

    /// Register the mutation binding once per page; it survives navigations.
    async fn ensure_binding(&self) -> Result<(), DomError> {
        self.binding
            .get_or_try_init(|| async {
                self.page
                    .execute(AddBindingParams::new(MUTATION_BINDING))
                    .await
                    .map_err(|e| DomError::Other(format!("Failed to add binding: {}", e)))?;
                debug!("Registered {} binding", MUTATION_BINDING);
                Ok::<(), DomError>(())
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl Document for CdpDocument {
    async fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, DomError> {
        self.request(PageRequest::Query {
            selector: selector.to_string(),
        })
        .await
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>, DomError> {
        self.request(PageRequest::QueryAll {
            selector: selector.to_string(),
        })
        .await
    }

    async fn value(&self, element: ElementId) -> Result<String, DomError> {
        self.request(PageRequest::GetValue { element }).await
    }

    async fn set_value(&self, element: ElementId, value: &str) -> Result<(), DomError> {
        self.request_unit(PageRequest::SetValue {
            element,
            value: value.to_string(),
        })
        .await
    }

    async fn inner_text(&self, element: ElementId) -> Result<String, DomError> {
        self.request(PageRequest::InnerText { element }).await
    }

    async fn dispatch_event(
        &self,
        element: ElementId,
        event: &DomEvent,
    ) -> Result<bool, DomError> {
        self.request(PageRequest::Dispatch {
            element,
            event: event.clone(),
        })
        .await
    }

    async fn focus(&self, element: ElementId) -> Result<(), DomError> {
        self.request_unit(PageRequest::Focus { element }).await
    }

    async fn click(&self, element: ElementId) -> Result<(), DomError> {
        self.request_unit(PageRequest::Click { element }).await
    }

    async fn scroll_into_view(&self, element: ElementId) -> Result<(), DomError> {
        self.request_unit(PageRequest::ScrollIntoView { element })
            .await
    }

    async fn observe_mutations(&self) -> Result<Box<dyn MutationSubscription>, DomError> {
        self.ensure_binding().await?;
        // Listen before the observer exists so no report is missed.
        let events = self
            .page
            .event_listener::<EventBindingCalled>()
            .await
            .map_err(|e| DomError::Other(format!("Failed to listen for bindings: {}", e)))?;

        let observer: u64 = self
            .request(PageRequest::Observe {
                binding: MUTATION_BINDING.to_string(),
            })
            .await?;
        debug!("Started page mutation observer {}", observer);

        Ok(Box::new(CdpSubscription {
            page: self.page.clone(),
            events,
            observer,
            released: false,
        }))
    }

    async fn insert_style(&self, css: &str) -> Result<ElementId, DomError> {
        self.request(PageRequest::InsertStyle {
            css: css.to_string(),
        })
        .await
    }

    async fn show_notice(&self, notice: &Notice) -> Result<ElementId, DomError> {
        self.request(PageRequest::ShowNotice {
            notice: notice.clone(),
        })
        .await
    }

    async fn remove(&self, element: ElementId) -> Result<(), DomError> {
        self.request_unit(PageRequest::Remove { element }).await
    }
}

struct CdpSubscription {
    page: Page,
    events: EventStream<EventBindingCalled>,
    observer: u64,
    released: bool,
}

#[async_trait]
impl MutationSubscription for CdpSubscription {
    async fn next_batch(&mut self) -> Option<MutationBatch> {
        while let Some(event) = self.events.next().await {
            if event.name != MUTATION_BINDING {
                continue;
            }
            match serde_json::from_str::<MutationReport>(&event.payload) {
                Ok(report) if report.observer == self.observer => {
                    return Some(MutationBatch {
                        records: report.records,
                    });
                }
                Ok(_) => {}
                Err(e) => warn!("Malformed mutation report: {}", e),
            }
        }
        None
    }

    async fn disconnect(mut self: Box<Self>) -> Result<(), DomError> {
        self.released = true;
        process(
            &self.page,
            &PageRequest::Disconnect {
                observer: self.observer,
            },
        )
        .await
        .map(|_| ())
    }
}

impl Drop for CdpSubscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let page = self.page.clone();
        let observer = self.observer;
        handle.spawn(async move {
            if let Err(e) = process(&page, &PageRequest::Disconnect { observer }).await {
                debug!("Failed to disconnect dropped observer {}: {}", observer, e);
            }
        });
    }
}
