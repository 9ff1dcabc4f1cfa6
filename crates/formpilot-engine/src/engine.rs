use crate::config::Timings;
use crate::document::Document;
use crate::fill::{FieldFiller, FillReport};
use crate::options::OptionCandidate;
use crate::profile::ProfileDefinition;
use crate::typist::ComboBoxTypist;
use crate::wait::wait_for;
use formpilot_common::error::AutomationError;
use formpilot_common::protocol::SolverResult;
use serde::Serialize;
use tracing::{error, info};

/// Everything a completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub fields: FillReport,
    pub selected: OptionCandidate,
    pub optional: FillReport,
}

/// Runs one profile's wait, fill, type, select and optional-fill sequence
/// against a document. Steps run strictly in order; the first failure ends the
/// run and nothing already written is rolled back.
pub struct FormAutomationEngine<'a> {
    profile: &'a ProfileDefinition,
    timings: Timings,
}

impl<'a> FormAutomationEngine<'a> {
    /// `base` timings are adjusted by the profile's own overrides.
    pub fn new(profile: &'a ProfileDefinition, base: &Timings) -> Self {
        Self {
            profile,
            timings: profile.timings.apply(base),
        }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub async fn run(&self, document: &dyn Document) -> SolverResult {
        match self.execute(document).await {
            Ok(summary) => {
                let message = format!(
                    "{} form filled successfully! {}: {}",
                    self.profile.name, self.profile.combo_box.label, summary.selected.text
                );
                info!("{}", message);
                SolverResult::succeeded(message)
            }
            Err(e) => {
                error!("Profile {} failed: {}", self.profile.id, e);
                SolverResult::failed(format!("Error: {}", e))
            }
        }
    }

    pub async fn execute(&self, document: &dyn Document) -> Result<RunSummary, AutomationError> {
        let profile = self.profile;
        info!("Running profile {}", profile.id);

        wait_for(document, &profile.form, self.timings.form_timeout()).await?;

        let filler = FieldFiller::new(document, self.timings.fill_settle());
        let fields = filler.fill_fields(&profile.fields).await?;

        let typist = ComboBoxTypist::new(document, &self.timings);
        let selected = typist.choose(&profile.combo_box).await?;

        let blank_fill = profile
            .blank_fill
            .as_ref()
            .map(|b| (b.locator.as_str(), b.text.as_str()));
        let optional = filler
            .fill_optional(&profile.optional_fields, blank_fill)
            .await?;

        Ok(RunSummary {
            fields,
            selected,
            optional,
        })
    }
}
