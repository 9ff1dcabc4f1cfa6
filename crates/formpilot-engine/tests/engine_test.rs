use formpilot_engine::config::Timings;
use formpilot_engine::engine::FormAutomationEngine;
use formpilot_engine::memory::{ElementSpec, MemoryDocument};
use formpilot_engine::profile::builtin::greenhouse_calendly;
use formpilot_engine::rehearsal::{SELECTED_ATTRIBUTE, rehearsal_document};
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

/// A Greenhouse-like application page whose location combo box renders its
/// options 400ms after "Istanbul" has been typed and remembers the clicked one.
fn greenhouse_page(with_options: bool) -> MemoryDocument {
    let doc = MemoryDocument::new();
    let form = doc.append_to_body(ElementSpec::new("form").id("application-form"));
    for id in ["first_name", "last_name", "email", "phone"] {
        doc.append(form, ElementSpec::new("input").id(id)).unwrap();
    }
    let combo = doc
        .append(form, ElementSpec::new("input").id("candidate-location"))
        .unwrap();
    doc.append(form, ElementSpec::new("input").attr("name", "question_linkedin"))
        .unwrap();
    doc.append(form, ElementSpec::new("textarea").id("cover_letter"))
        .unwrap();
    doc.append(
        form,
        ElementSpec::new("textarea")
            .id("additional")
            .value("Already answered"),
    )
    .unwrap();

    if with_options {
        doc.on_event(move |doc, dispatched| {
            if dispatched.target == combo
                && dispatched.event.event_type() == "input"
                && dispatched.value == "Istanbul"
            {
                let page = doc.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(400)).await;
                    page.append_to_body(
                        ElementSpec::new("div")
                            .class("select__menu")
                            .child(ElementSpec::new("div").class("select__option").text("Istanbul, Turkey"))
                            .child(
                                ElementSpec::new("div")
                                    .class("select__option")
                                    .text("Istanbul, New York"),
                            ),
                    );
                });
            }

            // Picking an option records it on the combo box, like the real widget.
            let is_option = doc
                .attribute_of(dispatched.target, "class")
                .is_some_and(|class| class.split_whitespace().any(|c| c == "select__option"));
            if dispatched.event.event_type() == "click" && is_option {
                let chosen = doc.text_of(dispatched.target).unwrap_or_default();
                doc.set_attribute(combo, SELECTED_ATTRIBUTE, &chosen).unwrap();
            }
        });
    }
    doc
}

fn position(doc: &MemoryDocument, selector: &str, event_type: &str) -> usize {
    let element = doc.find(selector).unwrap().unwrap();
    doc.events()
        .iter()
        .position(|e| e.target == element && e.event.event_type() == event_type)
        .unwrap()
}

// ============================================================================
// Successful runs
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_run_fills_the_form() {
    let doc = greenhouse_page(true);
    let profile = greenhouse_calendly::definition();
    let engine = FormAutomationEngine::new(&profile, &Timings::default());

    let result = engine.run(&doc).await;

    assert!(result.success, "{}", result.message);
    assert_eq!(
        result.message,
        "Greenhouse Calendly application form filled successfully! Location: Istanbul, Turkey"
    );
    assert_eq!(doc.value_of("#first_name").as_deref(), Some("John"));
    assert_eq!(doc.value_of("#last_name").as_deref(), Some("Doe"));
    assert_eq!(doc.value_of("#email").as_deref(), Some("john.doe@example.com"));
    assert_eq!(doc.value_of("#phone").as_deref(), Some("+90 555 123 4567"));
    assert_eq!(doc.value_of("#candidate-location").as_deref(), Some("Istanbul"));
    assert_eq!(
        doc.value_of("input[name*=\"linkedin\"]").as_deref(),
        Some("https://linkedin.com/in/johndoe")
    );
    assert!(
        doc.value_of("#cover_letter")
            .unwrap()
            .starts_with("I am excited to apply")
    );
    assert_eq!(doc.value_of("#additional").as_deref(), Some("Already answered"));
    assert_eq!(doc.active_observers(), 0);

    let combo = doc.find("#candidate-location").unwrap().unwrap();
    assert_eq!(
        doc.attribute_of(combo, SELECTED_ATTRIBUTE).as_deref(),
        Some("Istanbul, Turkey")
    );
}

#[tokio::test(start_paused = true)]
async fn test_steps_run_in_order() {
    let doc = greenhouse_page(true);
    let profile = greenhouse_calendly::definition();
    let result = FormAutomationEngine::new(&profile, &Timings::default())
        .run(&doc)
        .await;
    assert!(result.success);

    let last_basic = position(&doc, "#phone", "change");
    let first_typed = position(&doc, "#candidate-location", "keydown");
    let option_click = position(&doc, ".select__option", "click");
    let optional = position(&doc, "input[name*=\"linkedin\"]", "input");

    assert!(last_basic < first_typed);
    assert!(first_typed < option_click);
    assert!(option_click < optional);
}

#[tokio::test(start_paused = true)]
async fn test_rehearsal_document_runs_to_completion() {
    let profile = greenhouse_calendly::definition();
    let doc = rehearsal_document(&profile).unwrap();

    let result = FormAutomationEngine::new(&profile, &Timings::default())
        .run(&doc)
        .await;

    assert!(result.success, "{}", result.message);
    assert!(result.message.ends_with("Location: Istanbul, Rehearsal"));
    let combo = doc.find("#candidate-location").unwrap().unwrap();
    assert_eq!(
        doc.attribute_of(combo, SELECTED_ATTRIBUTE).as_deref(),
        Some("Istanbul, Rehearsal")
    );
}

#[test]
fn test_profile_timings_override_configuration() {
    let mut profile = greenhouse_calendly::definition();
    profile.timings.keystroke_delay_ms = Some(20);
    let base = Timings {
        option_timeout_ms: 9000,
        ..Timings::default()
    };

    let engine = FormAutomationEngine::new(&profile, &base);
    assert_eq!(engine.timings().keystroke_delay_ms, 20);
    assert_eq!(engine.timings().option_timeout_ms, 9000);
    assert_eq!(engine.timings().search_settle_ms, 1500);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_missing_form_fails_without_touching_the_page() {
    let doc = MemoryDocument::new();
    doc.append_to_body(ElementSpec::new("input").id("first_name"));
    let profile = greenhouse_calendly::definition();

    let result = FormAutomationEngine::new(&profile, &Timings::default())
        .run(&doc)
        .await;

    assert!(!result.success);
    assert_eq!(
        result.message,
        "Error: Element not found: form[id*=\"application\"]"
    );
    assert!(doc.events().is_empty());
    assert_eq!(doc.value_of("#first_name").as_deref(), Some(""));
}

#[tokio::test(start_paused = true)]
async fn test_missing_option_keeps_earlier_fills() {
    let doc = greenhouse_page(false);
    let profile = greenhouse_calendly::definition();

    let result = FormAutomationEngine::new(&profile, &Timings::default())
        .run(&doc)
        .await;

    assert!(!result.success);
    assert_eq!(
        result.message,
        "Error: Location option not found in dropdown: Istanbul"
    );
    // No rollback, and nothing after the failing step ran.
    assert_eq!(doc.value_of("#first_name").as_deref(), Some("John"));
    assert_eq!(doc.value_of("input[name*=\"linkedin\"]").as_deref(), Some(""));
    assert_eq!(doc.value_of("#cover_letter").as_deref(), Some(""));
    assert_eq!(doc.active_observers(), 0);
}
