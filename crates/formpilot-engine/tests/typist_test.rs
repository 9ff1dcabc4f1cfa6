use formpilot_engine::config::Timings;
use formpilot_engine::error::AutomationError;
use formpilot_engine::memory::{ElementSpec, MemoryDocument};
use formpilot_engine::profile::ComboBoxSpec;
use formpilot_engine::protocol::DomEvent;
use formpilot_engine::typist::ComboBoxTypist;
use std::time::Duration;
use tokio::time::Instant;

const COMBO: &str = "#candidate-location";

fn combo_spec() -> ComboBoxSpec {
    ComboBoxSpec {
        locator: COMBO.to_string(),
        text: "Istanbul".to_string(),
        option_locator: ".select__option".to_string(),
        label: "Location".to_string(),
    }
}

/// A combo box input that renders its option list 300ms after the full text is typed.
fn combo_page(option: &'static str) -> MemoryDocument {
    let doc = MemoryDocument::new();
    let input = doc.append_to_body(ElementSpec::new("input").id("candidate-location").value("Ank"));
    doc.on_event(move |doc, dispatched| {
        if dispatched.target == input
            && dispatched.event.event_type() == "input"
            && dispatched.value == "Istanbul"
        {
            let page = doc.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                page.append_to_body(
                    ElementSpec::new("div")
                        .class("select__menu")
                        .child(ElementSpec::new("div").class("select__option").text(option)),
                );
            });
        }
    });
    doc
}

#[tokio::test(start_paused = true)]
async fn test_typing_emits_per_character_sequence() {
    let doc = combo_page("Istanbul, Turkey");
    let timings = Timings::default();
    let typist = ComboBoxTypist::new(&doc, &timings);

    let start = Instant::now();
    let input = typist.type_into(COMBO, "Ist").await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(doc.focused(), Some(input));
    assert!(elapsed >= Duration::from_millis(450) && elapsed < Duration::from_millis(500));

    let events = doc.events_for(input);
    let types: Vec<_> = events.iter().map(|e| e.event.event_type()).collect();
    assert_eq!(
        types,
        vec![
            "click", "keydown", "input", "keyup", "keydown", "input", "keyup", "keydown", "input",
            "keyup"
        ]
    );

    // keydown sees the previous prefix, input and keyup the new one.
    let values: Vec<_> = events.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(
        values,
        vec!["Ank", "", "I", "I", "I", "Is", "Is", "Is", "Ist", "Ist"]
    );

    assert_eq!(events[1].event, DomEvent::key_down('I'));
    assert_eq!(events[2].event, DomEvent::insert_text('I'));
    assert_eq!(events[3].event, DomEvent::key_up('I'));
    match &events[1].event {
        DomEvent::Keyboard(key) => {
            assert_eq!(key.code, "KeyI");
            assert_eq!(key.key_code, 'I' as u32);
            assert_eq!(key.char_code, 'I' as u32);
            assert!(key.bubbles && key.cancelable);
        }
        other => panic!("expected keyboard event, got {:?}", other),
    }
    match &events[2].event {
        DomEvent::Input(input) => {
            assert_eq!(input.data, "I");
            assert_eq!(input.input_type, "insertText");
            assert!(input.bubbles && input.cancelable);
        }
        other => panic!("expected input event, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_input_is_not_found() {
    let doc = MemoryDocument::new();
    let timings = Timings::default();
    let err = ComboBoxTypist::new(&doc, &timings)
        .choose(&combo_spec())
        .await
        .unwrap_err();
    assert!(matches!(err, AutomationError::NotFound { locator } if locator == COMBO));
}

#[tokio::test(start_paused = true)]
async fn test_choose_selects_rendered_option() {
    let doc = combo_page("Istanbul, Turkey");
    let timings = Timings::default();

    let start = Instant::now();
    let option = ComboBoxTypist::new(&doc, &timings)
        .choose(&combo_spec())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(option.text, "Istanbul, Turkey");
    let clicks: Vec<_> = doc
        .events_for(option.element)
        .iter()
        .map(|e| e.event.event_type().to_string())
        .collect();
    assert_eq!(clicks, vec!["click"]);

    // 8 keystrokes, the search settle, then the selection settle.
    let expected = Duration::from_millis(8 * 150 + 1500 + 500);
    assert!(elapsed >= expected && elapsed < expected + Duration::from_millis(100));
    assert_eq!(doc.active_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_choose_waits_for_late_options() {
    let doc = combo_page("Istanbul, Turkey");
    let timings = Timings {
        search_settle_ms: 0,
        ..Timings::default()
    };

    let option = ComboBoxTypist::new(&doc, &timings)
        .choose(&combo_spec())
        .await
        .unwrap();
    assert_eq!(option.text, "Istanbul, Turkey");
    assert_eq!(doc.active_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_choose_without_matching_option_fails() {
    let doc = combo_page("Ankara, Turkey");
    let timings = Timings::default();

    let start = Instant::now();
    let err = ComboBoxTypist::new(&doc, &timings)
        .choose(&combo_spec())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Location option not found in dropdown: Istanbul");
    assert!(start.elapsed() >= Duration::from_millis(8 * 150 + 1500 + 5000));
    assert_eq!(doc.active_observers(), 0);
}
