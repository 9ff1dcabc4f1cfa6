use crate::config::Timings;
use crate::document::Document;
use crate::options::{OptionCandidate, find_option};
use crate::profile::ComboBoxSpec;
use formpilot_common::error::AutomationError;
use formpilot_common::protocol::{DomEvent, ElementId};
use tracing::{debug, info};

/// Progress through one typed string. Lives for a single `type_into` call.
struct TypingSession {
    element: ElementId,
    text: Vec<char>,
    cursor: usize,
}

impl TypingSession {
    fn new(element: ElementId, text: &str) -> Self {
        Self {
            element,
            text: text.chars().collect(),
            cursor: 0,
        }
    }

    /// Next character and the input's expected value once it is typed.
    fn advance(&mut self) -> Option<(char, String)> {
        let c = *self.text.get(self.cursor)?;
        self.cursor += 1;
        Some((c, self.text[..self.cursor].iter().collect()))
    }
}

/// Drives a searchable dropdown by typing into it one key at a time and then
/// picking the option the page renders for the typed text.
pub struct ComboBoxTypist<'a> {
    document: &'a dyn Document,
    timings: &'a Timings,
}

impl<'a> ComboBoxTypist<'a> {
    pub fn new(document: &'a dyn Document, timings: &'a Timings) -> Self {
        Self { document, timings }
    }

    /// Focus, clear and type `text` into the input at `locator`.
    ///
    /// Each character produces keydown, a value write of the prefix typed so
    /// far, an `insertText` input event and keyup, followed by the keystroke
    /// delay.
    pub async fn type_into(&self, locator: &str, text: &str) -> Result<ElementId, AutomationError> {
        let element = self
            .document
            .query_selector(locator)
            .await?
            .ok_or_else(|| AutomationError::not_found(locator))?;

        self.document.focus(element).await?;
        self.document.click(element).await?;
        self.document.set_value(element, "").await?;

        let mut session = TypingSession::new(element, text);
        while let Some((c, typed)) = session.advance() {
            self.keystroke(session.element, c, &typed).await?;
            tokio::time::sleep(self.timings.keystroke_delay()).await;
        }
        debug!("Typed {:?} into {}", text, locator);
        Ok(element)
    }

    async fn keystroke(&self, element: ElementId, c: char, typed: &str) -> Result<(), AutomationError> {
        self.document
            .dispatch_event(element, &DomEvent::key_down(c))
            .await?;
        self.document.set_value(element, typed).await?;
        self.document
            .dispatch_event(element, &DomEvent::insert_text(c))
            .await?;
        self.document
            .dispatch_event(element, &DomEvent::key_up(c))
            .await?;
        Ok(())
    }

    /// Type the combo box's text, wait for the matching option and select it.
    pub async fn choose(&self, combo: &ComboBoxSpec) -> Result<OptionCandidate, AutomationError> {
        self.type_into(&combo.locator, &combo.text).await?;
        tokio::time::sleep(self.timings.search_settle()).await;

        let option = find_option(
            self.document,
            &combo.option_locator,
            &combo.text,
            self.timings.option_timeout(),
        )
        .await?
        .ok_or_else(|| AutomationError::OptionNotFound {
            label: combo.label.clone(),
            text: combo.text.clone(),
        })?;

        self.document.scroll_into_view(option.element).await?;
        self.document.click(option.element).await?;
        tokio::time::sleep(self.timings.selection_settle()).await;

        info!("Selected {} option {:?}", combo.label, option.text);
        Ok(option)
    }
}
