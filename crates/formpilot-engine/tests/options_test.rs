use formpilot_engine::memory::{ElementSpec, MemoryDocument};
use formpilot_engine::options::find_option;
use std::time::Duration;
use tokio::time::Instant;

fn menu(options: &[&str]) -> ElementSpec {
    options.iter().fold(
        ElementSpec::new("div").class("select__menu"),
        |menu, text| menu.child(ElementSpec::new("div").class("select__option").text(text)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_first_matching_option_in_document_order() {
    let doc = MemoryDocument::new();
    doc.append_to_body(menu(&["Ankara, Turkey", "Istanbul, Turkey", "Istanbul, New York"]));

    let option = find_option(&doc, ".select__option", "Istanbul", Duration::from_millis(5000))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(option.text, "Istanbul, Turkey");
    assert_eq!(doc.active_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_match_is_by_substring() {
    let doc = MemoryDocument::new();
    doc.append_to_body(menu(&["TR Istanbul, Turkey (+90)"]));

    let option = find_option(&doc, ".select__option", "Istanbul", Duration::from_millis(5000))
        .await
        .unwrap();

    assert_eq!(option.map(|o| o.text).as_deref(), Some("TR Istanbul, Turkey (+90)"));
}

#[tokio::test(start_paused = true)]
async fn test_option_rendered_later_is_found() {
    let doc = MemoryDocument::new();
    doc.append_to_body(menu(&["Loading..."]));
    let page = doc.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2000)).await;
        page.append_to_body(menu(&["Istanbul, Turkey"]));
    });

    let start = Instant::now();
    let option = find_option(&doc, ".select__option", "Istanbul", Duration::from_millis(5000))
        .await
        .unwrap();

    assert!(option.is_some());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(2000) && elapsed < Duration::from_millis(2100));
    assert_eq!(doc.active_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_match_resolves_to_none_at_deadline() {
    let doc = MemoryDocument::new();
    doc.append_to_body(menu(&["Ankara, Turkey"]));

    let start = Instant::now();
    let option = find_option(&doc, ".select__option", "Istanbul", Duration::from_millis(5000))
        .await
        .unwrap();

    assert!(option.is_none());
    assert!(start.elapsed() >= Duration::from_millis(5000));
    assert_eq!(doc.active_observers(), 0);
}
