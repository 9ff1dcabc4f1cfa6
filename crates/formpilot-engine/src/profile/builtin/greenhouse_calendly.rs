use crate::config::TimingOverrides;
use crate::profile::definition::*;
use formpilot_common::protocol::{FieldAssignment, TargetDescriptor};

pub const ID: &str = "greenhouse-calendly";

const COVER_LETTER: &str = "I am excited to apply for this position. I have extensive experience in the field and believe I would be a great fit for your team.";

/// Calendly's Greenhouse job board, whose location field is a React-Select v5 combo box.
pub fn definition() -> ProfileDefinition {
    ProfileDefinition {
        id: ID.to_string(),
        name: "Greenhouse Calendly application".to_string(),
        short_description: "React-Select location form".to_string(),
        url: "https://job-boards.greenhouse.io/calendly/jobs/8171767002".to_string(),
        description: "Fills Greenhouse job application form with React-Select v5 location field (Istanbul, Turkey)".to_string(),
        form: TargetDescriptor::new("form[id*=\"application\"]"),
        fields: vec![
            FieldAssignment::new("#first_name", "John"),
            FieldAssignment::new("#last_name", "Doe"),
            FieldAssignment::new("#email", "john.doe@example.com"),
            FieldAssignment::new("#phone", "+90 555 123 4567"),
        ],
        combo_box: ComboBoxSpec {
            locator: "#candidate-location".to_string(),
            text: "Istanbul".to_string(),
            option_locator: ".select__option".to_string(),
            label: "Location".to_string(),
        },
        optional_fields: vec![
            FieldAssignment::new("input[name*=\"linkedin\"]", "https://linkedin.com/in/johndoe"),
            FieldAssignment::new("input[name*=\"website\"]", "https://johndoe.com"),
        ],
        blank_fill: Some(BlankFill {
            locator: "textarea".to_string(),
            text: COVER_LETTER.to_string(),
        }),
        timings: TimingOverrides::default(),
        tier: ProfileTier::BuiltIn,
    }
}
