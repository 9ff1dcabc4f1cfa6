use crate::config::TimingOverrides;
use formpilot_common::protocol::{FieldAssignment, TargetDescriptor};
use serde::{Deserialize, Serialize};

/// Where a profile came from, which decides who wins on an id clash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTier {
    BuiltIn,
    #[default]
    Loaded,
}

/// A searchable dropdown and the entry to pick from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboBoxSpec {
    /// The text input the user types into.
    pub locator: String,
    /// Typed verbatim, then matched as a substring of the option text.
    pub text: String,
    #[serde(default = "default_option_locator")]
    pub option_locator: String,
    /// Human-readable field name used in messages.
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_option_locator() -> String {
    ".select__option".to_string()
}

fn default_label() -> String {
    "Location".to_string()
}

/// Catch-all fill for free-text areas the page leaves empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankFill {
    pub locator: String,
    pub text: String,
}

/// Everything needed to automate one application form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    /// Container that signals the form has rendered.
    pub form: TargetDescriptor,
    #[serde(default)]
    pub fields: Vec<FieldAssignment>,
    pub combo_box: ComboBoxSpec,
    #[serde(default)]
    pub optional_fields: Vec<FieldAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank_fill: Option<BlankFill>,
    #[serde(default)]
    pub timings: TimingOverrides,
    #[serde(default)]
    pub tier: ProfileTier,
}
