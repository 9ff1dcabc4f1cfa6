//! Dry-run pages synthesised from a profile's own locators.
//!
//! Every selector the profile uses is materialised into an element that
//! satisfies it, and the combo box is given just enough behaviour to render a
//! matching option once its text has been typed. Running the profile against
//! the result exercises the full sequence without a browser.

use crate::memory::{ElementSpec, MemoryDocument, compile_selector};
use crate::profile::ProfileDefinition;
use formpilot_common::error::DomError;
use formpilot_common::protocol::ElementId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// How long the synthetic combo box takes to "search" before rendering its option.
pub const OPTION_RENDER_DELAY: Duration = Duration::from_millis(200);

/// Attribute set on the combo box input once its option has been clicked.
pub const SELECTED_ATTRIBUTE: &str = "data-selected";

const OPTION_MARKER: &str = "data-rehearsal-option";

fn materialize(locator: &str, leaf_tag: &str) -> Result<ElementSpec, DomError> {
    let list = compile_selector(locator)?;
    match list.selectors.first() {
        Some(first) => Ok(first.materialize(leaf_tag)),
        None => Err(DomError::InvalidSelector {
            selector: locator.to_string(),
            reason: "empty selector list".to_string(),
        }),
    }
}

/// Build a document on which `profile` should run to completion.
pub fn rehearsal_document(profile: &ProfileDefinition) -> Result<MemoryDocument, DomError> {
    let document = MemoryDocument::new();
    let form = document.append_to_body(materialize(&profile.form.locator, "form")?);

    for field in profile.fields.iter().chain(&profile.optional_fields) {
        append_unless_present(&document, form, &field.locator, "input")?;
    }
    if let Some(blank) = &profile.blank_fill {
        append_unless_present(&document, form, &blank.locator, "textarea")?;
    }
    let combo = append_unless_present(&document, form, &profile.combo_box.locator, "input")?;

    let mut option = materialize(&profile.combo_box.option_locator, "div")?;
    let leaf = leaf_mut(&mut option);
    leaf.attributes.insert(OPTION_MARKER.to_string(), String::new());
    leaf.text = format!("{}, Rehearsal", profile.combo_box.text);

    install_combo_behaviour(&document, combo, &profile.combo_box.text, option);
    Ok(document)
}

fn leaf_mut(spec: &mut ElementSpec) -> &mut ElementSpec {
    if spec.children.is_empty() {
        return spec;
    }
    leaf_mut(&mut spec.children[0])
}

fn append_unless_present(
    document: &MemoryDocument,
    form: ElementId,
    locator: &str,
    leaf_tag: &str,
) -> Result<ElementId, DomError> {
    if let Some(existing) = document.find(locator)? {
        return Ok(existing);
    }
    document.append(form, materialize(locator, leaf_tag)?)
}

fn install_combo_behaviour(
    document: &MemoryDocument,
    combo: ElementId,
    text: &str,
    option: ElementSpec,
) {
    let rendered = Arc::new(AtomicBool::new(false));
    let text = text.to_string();

    document.on_event(move |document, dispatched| {
        let event_type = dispatched.event.event_type();

        if dispatched.target == combo
            && event_type == "input"
            && dispatched.value == text
            && !rendered.swap(true, Ordering::SeqCst)
        {
            let document = document.clone();
            let menu = ElementSpec::new("div")
                .class("rehearsal-menu")
                .child(option.clone());
            tokio::spawn(async move {
                tokio::time::sleep(OPTION_RENDER_DELAY).await;
                document.append_to_body(menu);
                debug!("Rendered rehearsal option");
            });
        }

        if event_type == "click" && document.attribute_of(dispatched.target, OPTION_MARKER).is_some()
        {
            let chosen = document.text_of(dispatched.target).unwrap_or_default();
            // The combo box may have been detached by the page; nothing to mark then.
            let _ = document.set_attribute(combo, SELECTED_ATTRIBUTE, &chosen);
        }
    });
}
