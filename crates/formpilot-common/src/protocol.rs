use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element inside a document.
///
/// In-memory documents hand out node indices; live pages hand out ids from the
/// page runtime's handle table. A handle is only meaningful for the document
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A locator that must resolve to an existing element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub locator: String,
}

impl TargetDescriptor {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }
}

impl From<&str> for TargetDescriptor {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

/// One simple field to populate: where, and with what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub locator: String,
    pub value: String,
}

impl FieldAssignment {
    pub fn new(locator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            value: value.into(),
        }
    }
}

/// Terminal outcome of an automation run, handed to the reporting side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverResult {
    pub success: bool,
    pub message: String,
}

impl SolverResult {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// ============================================================
// Synthetic events
// ============================================================

/// A synthetic event to dispatch on an element.
///
/// Field names serialize in the shape of the DOM event init dictionaries so the
/// page runtime can hand them straight to the event constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomEvent {
    Basic(BasicEventInit),
    Keyboard(KeyboardEventInit),
    Input(InputEventInit),
    Mouse(MouseEventInit),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicEventInit {
    #[serde(rename = "type")]
    pub event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardEventInit {
    #[serde(rename = "type")]
    pub event_type: String,
    pub key: String,
    pub code: String,
    pub char_code: u32,
    pub key_code: u32,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEventInit {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: String,
    pub input_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseEventInit {
    #[serde(rename = "type")]
    pub event_type: String,
    pub button: u16,
    pub bubbles: bool,
    pub cancelable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

impl KeyPhase {
    fn event_type(self) -> &'static str {
        match self {
            KeyPhase::Down => "keydown",
            KeyPhase::Up => "keyup",
        }
    }
}

impl DomEvent {
    /// Bubbling `input` notification with no payload.
    pub fn input() -> Self {
        Self::basic("input")
    }

    /// Bubbling `change` notification.
    pub fn change() -> Self {
        Self::basic("change")
    }

    fn basic(event_type: &str) -> Self {
        DomEvent::Basic(BasicEventInit {
            event_type: event_type.to_string(),
            bubbles: true,
            cancelable: false,
        })
    }

    pub fn key(phase: KeyPhase, c: char) -> Self {
        DomEvent::Keyboard(KeyboardEventInit {
            event_type: phase.event_type().to_string(),
            key: c.to_string(),
            code: key_code_for(c),
            char_code: c as u32,
            key_code: c as u32,
            bubbles: true,
            cancelable: true,
        })
    }

    pub fn key_down(c: char) -> Self {
        Self::key(KeyPhase::Down, c)
    }

    pub fn key_up(c: char) -> Self {
        Self::key(KeyPhase::Up, c)
    }

    /// `InputEvent` announcing insertion of a single character.
    pub fn insert_text(c: char) -> Self {
        DomEvent::Input(InputEventInit {
            event_type: "input".to_string(),
            data: c.to_string(),
            input_type: "insertText".to_string(),
            bubbles: true,
            cancelable: true,
        })
    }

    pub fn primary_click() -> Self {
        DomEvent::Mouse(MouseEventInit {
            event_type: "click".to_string(),
            button: 0,
            bubbles: true,
            cancelable: true,
        })
    }

    pub fn event_type(&self) -> &str {
        match self {
            DomEvent::Basic(e) => &e.event_type,
            DomEvent::Keyboard(e) => &e.event_type,
            DomEvent::Input(e) => &e.event_type,
            DomEvent::Mouse(e) => &e.event_type,
        }
    }

    pub fn bubbles(&self) -> bool {
        match self {
            DomEvent::Basic(e) => e.bubbles,
            DomEvent::Keyboard(e) => e.bubbles,
            DomEvent::Input(e) => e.bubbles,
            DomEvent::Mouse(e) => e.bubbles,
        }
    }
}

/// Physical key code name for a typed character, in the `KeyboardEvent.code` style.
pub fn key_code_for(c: char) -> String {
    match c {
        'a'..='z' | 'A'..='Z' => format!("Key{}", c.to_ascii_uppercase()),
        '0'..='9' => format!("Digit{}", c),
        ' ' => "Space".to_string(),
        _ => format!("Key{}", c.to_uppercase()),
    }
}

// ============================================================
// Mutations and notices
// ============================================================

/// One batch of tree mutations, as delivered by a mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatch {
    pub records: usize,
}

/// Batch report posted by the page runtime through the mutation binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReport {
    pub observer: u64,
    pub records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// An on-page overlay message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Notice {
    pub fn for_result(result: &SolverResult, dismiss_after_ms: u64) -> Self {
        Self {
            kind: if result.success {
                NoticeKind::Success
            } else {
                NoticeKind::Error
            },
            message: result.message.clone(),
            dismiss_after_ms,
        }
    }
}

// ============================================================
// Page runtime wire format
// ============================================================

/// Requests evaluated by the injected page runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageRequest {
    Query { selector: String },
    QueryAll { selector: String },
    GetValue { element: ElementId },
    SetValue { element: ElementId, value: String },
    InnerText { element: ElementId },
    Dispatch { element: ElementId, event: DomEvent },
    Focus { element: ElementId },
    Click { element: ElementId },
    ScrollIntoView { element: ElementId },
    Observe { binding: String },
    Disconnect { observer: u64 },
    InsertStyle { css: String },
    ShowNotice { notice: Notice },
    Remove { element: ElementId },
}

impl PageRequest {
    pub fn op_name(&self) -> &'static str {
        match self {
            PageRequest::Query { .. } => "query",
            PageRequest::QueryAll { .. } => "query_all",
            PageRequest::GetValue { .. } => "get_value",
            PageRequest::SetValue { .. } => "set_value",
            PageRequest::InnerText { .. } => "inner_text",
            PageRequest::Dispatch { .. } => "dispatch",
            PageRequest::Focus { .. } => "focus",
            PageRequest::Click { .. } => "click",
            PageRequest::ScrollIntoView { .. } => "scroll_into_view",
            PageRequest::Observe { .. } => "observe",
            PageRequest::Disconnect { .. } => "disconnect",
            PageRequest::InsertStyle { .. } => "insert_style",
            PageRequest::ShowNotice { .. } => "show_notice",
            PageRequest::Remove { .. } => "remove",
        }
    }
}

/// Responses returned by the page runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageResponse {
    Ok {
        #[serde(default)]
        value: serde_json::Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<serde_json::Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_codes() {
        assert_eq!(key_code_for('i'), "KeyI");
        assert_eq!(key_code_for('I'), "KeyI");
        assert_eq!(key_code_for('7'), "Digit7");
        assert_eq!(key_code_for(' '), "Space");
        assert_eq!(key_code_for('ş'), "KeyŞ");
    }

    #[test]
    fn test_keyboard_event_shape() {
        let event = DomEvent::key_down('s');
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "keyboard",
                "type": "keydown",
                "key": "s",
                "code": "KeyS",
                "charCode": 115,
                "keyCode": 115,
                "bubbles": true,
                "cancelable": true
            })
        );
    }

    #[test]
    fn test_insert_text_event_shape() {
        let value = serde_json::to_value(DomEvent::insert_text('t')).unwrap();
        assert_eq!(value["kind"], "input");
        assert_eq!(value["type"], "input");
        assert_eq!(value["inputType"], "insertText");
        assert_eq!(value["data"], "t");
        assert_eq!(value["cancelable"], true);
    }

    #[test]
    fn test_plain_notifications_bubble() {
        assert!(DomEvent::input().bubbles());
        assert!(DomEvent::change().bubbles());
        assert_eq!(DomEvent::change().event_type(), "change");
    }

    #[test]
    fn test_page_request_tagging() {
        let req = PageRequest::SetValue {
            element: ElementId(4),
            value: "John".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"op": "set_value", "element": 4, "value": "John"}));
        assert_eq!(req.op_name(), "set_value");
    }

    #[test]
    fn test_page_response_parsing() {
        let ok: PageResponse = serde_json::from_value(json!({"status": "ok", "value": [1, 2]})).unwrap();
        assert!(matches!(ok, PageResponse::Ok { value } if value == json!([1, 2])));

        let empty: PageResponse = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert!(matches!(empty, PageResponse::Ok { value } if value.is_null()));

        let err: PageResponse = serde_json::from_value(
            json!({"status": "error", "code": "STALE_ELEMENT", "message": "gone"}),
        )
        .unwrap();
        assert!(matches!(err, PageResponse::Error { code, .. } if code == "STALE_ELEMENT"));
    }

    #[test]
    fn test_solver_result_json() {
        let result = SolverResult::failed("Error: Element not found: form");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "message": "Error: Element not found: form"})
        );
    }
}
