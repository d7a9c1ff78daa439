use serde_json::{Map, Value};

use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";

/// Declarative rules for one string field of an inbound payload
#[derive(Debug, Clone, Copy)]
pub struct CharField {
    pub name: &'static str,
    pub required: bool,
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub trim: bool,
}

impl CharField {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            allow_blank: false,
            max_length: None,
            trim: true,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub const fn no_trim(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Read and validate the field. Problems are recorded in `errors` and
    /// yield `None`; an absent optional field also yields `None`.
    /// With `partial`, absence is never an error.
    pub fn read(&self, data: &Map<String, Value>, partial: bool, errors: &mut FieldErrors) -> Option<String> {
        let raw = match data.get(self.name) {
            None => {
                if self.required && !partial {
                    errors.insert(self.name.to_string(), REQUIRED.to_string());
                }
                return None;
            }
            Some(Value::Null) => {
                errors.insert(self.name.to_string(), NULL.to_string());
                return None;
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                errors.insert(self.name.to_string(), NOT_A_STRING.to_string());
                return None;
            }
        };

        let value = if self.trim { raw.trim().to_string() } else { raw };

        if value.is_empty() && !self.allow_blank {
            errors.insert(self.name.to_string(), BLANK.to_string());
            return None;
        }
        if let Some(max) = self.max_length {
            if value.chars().count() > max {
                errors.insert(
                    self.name.to_string(),
                    format!("Ensure this field has no more than {} characters.", max),
                );
                return None;
            }
        }

        Some(value)
    }
}

/// The payload as a JSON object, or a validation error naming what arrived instead
pub fn payload_object(payload: &Value) -> Result<&Map<String, Value>, ApiError> {
    payload.as_object().ok_or_else(|| {
        let kind = match payload {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "str",
            Value::Array(_) => "list",
            Value::Object(_) => "dict",
        };
        ApiError::field_error(
            NON_FIELD_ERRORS,
            format!("Invalid data. Expected a dictionary, but got {}.", kind),
        )
    })
}

/// Turn collected field errors into a validation failure
pub fn check(errors: FieldErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid input", Some(errors)))
    }
}
