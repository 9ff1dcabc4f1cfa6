use crate::profile::definition::ProfileDefinition;
use formpilot_common::protocol::FieldAssignment;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Profile id cannot be empty")]
    EmptyId,
    #[error("Profile URL cannot be empty")]
    EmptyUrl,
    #[error("Form locator cannot be empty")]
    EmptyFormLocator,
    #[error("Combo box locator cannot be empty")]
    EmptyComboLocator,
    #[error("Combo box text cannot be empty")]
    EmptyComboText,
    #[error("Field locator cannot be empty")]
    EmptyFieldLocator,
    #[error("Duplicate field locator: {0}")]
    DuplicateField(String),
}

pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validatable for ProfileDefinition {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.form.locator.trim().is_empty() {
            return Err(ValidationError::EmptyFormLocator);
        }
        if self.combo_box.locator.trim().is_empty() {
            return Err(ValidationError::EmptyComboLocator);
        }
        if self.combo_box.text.is_empty() {
            return Err(ValidationError::EmptyComboText);
        }

        check_fields(&self.fields)?;
        check_fields(&self.optional_fields)?;
        Ok(())
    }
}

fn check_fields(fields: &[FieldAssignment]) -> Result<(), ValidationError> {
    let mut locators = HashSet::new();
    for field in fields {
        if field.locator.trim().is_empty() {
            return Err(ValidationError::EmptyFieldLocator);
        }
        if !locators.insert(field.locator.as_str()) {
            return Err(ValidationError::DuplicateField(field.locator.clone()));
        }
    }
    Ok(())
}
