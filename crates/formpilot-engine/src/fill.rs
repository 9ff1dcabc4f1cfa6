use crate::document::Document;
use formpilot_common::error::AutomationError;
use formpilot_common::protocol::{DomEvent, ElementId, FieldAssignment};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// What a fill pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Locators (or blank-fill matches) that received a value.
    pub filled: Vec<String>,
    /// Locators with no matching element.
    pub skipped: Vec<String>,
}

impl FillReport {
    fn merge(&mut self, other: FillReport) {
        self.filled.extend(other.filled);
        self.skipped.extend(other.skipped);
    }
}

/// Populates plain inputs the way a framework-controlled form expects:
/// value write, then bubbling `input` and `change`.
pub struct FieldFiller<'a> {
    document: &'a dyn Document,
    settle: Duration,
}

impl<'a> FieldFiller<'a> {
    pub fn new(document: &'a dyn Document, settle: Duration) -> Self {
        Self { document, settle }
    }

    /// Fill every assignment whose element exists, then pause once.
    pub async fn fill_fields(
        &self,
        assignments: &[FieldAssignment],
    ) -> Result<FillReport, AutomationError> {
        let report = self.fill_each(assignments).await?;
        tokio::time::sleep(self.settle).await;
        Ok(report)
    }

    /// Fill every element matching `locator` whose value is currently empty,
    /// then pause once.
    pub async fn fill_blank_matches(
        &self,
        locator: &str,
        text: &str,
    ) -> Result<FillReport, AutomationError> {
        let report = self.fill_blanks(locator, text).await?;
        tokio::time::sleep(self.settle).await;
        Ok(report)
    }

    /// Optional assignments plus an optional blank fill, sharing one pause.
    pub async fn fill_optional(
        &self,
        assignments: &[FieldAssignment],
        blank_fill: Option<(&str, &str)>,
    ) -> Result<FillReport, AutomationError> {
        let mut report = self.fill_each(assignments).await?;
        if let Some((locator, text)) = blank_fill {
            report.merge(self.fill_blanks(locator, text).await?);
        }
        tokio::time::sleep(self.settle).await;
        Ok(report)
    }

    async fn fill_each(
        &self,
        assignments: &[FieldAssignment],
    ) -> Result<FillReport, AutomationError> {
        let mut report = FillReport::default();
        for assignment in assignments {
            match self.document.query_selector(&assignment.locator).await? {
                Some(element) => {
                    self.write(element, &assignment.value).await?;
                    report.filled.push(assignment.locator.clone());
                }
                None => {
                    debug!("Skipping missing field {}", assignment.locator);
                    report.skipped.push(assignment.locator.clone());
                }
            }
        }
        info!(
            "Filled {} field(s), skipped {}",
            report.filled.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn fill_blanks(&self, locator: &str, text: &str) -> Result<FillReport, AutomationError> {
        let mut report = FillReport::default();
        for element in self.document.query_selector_all(locator).await? {
            if self.document.value(element).await?.is_empty() {
                self.write(element, text).await?;
                report.filled.push(format!("{} {}", locator, element));
            }
        }
        debug!("Blank fill of {} touched {} element(s)", locator, report.filled.len());
        Ok(report)
    }

    async fn write(&self, element: ElementId, value: &str) -> Result<(), AutomationError> {
        self.document.set_value(element, value).await?;
        self.document.dispatch_event(element, &DomEvent::input()).await?;
        self.document.dispatch_event(element, &DomEvent::change()).await?;
        Ok(())
    }
}
