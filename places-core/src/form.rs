//! The "create a place" form.
//!
//! A static table of [`PlaceField`] descriptors drives both prompting and validation, so
//! adding a field means adding a row, not new logic.

use std::collections::HashMap;

use crate::{api::PlacesApi, error::PlacesError, model::PlacePayload};

pub const CREATED_NOTICE: &str = "Place added successfully!";
pub const FAILED_NOTICE: &str = "Failed to add place";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub options: &'static [&'static str],
    pub max_length: Option<usize>,
}

impl PlaceField {
    /// Text shown under the input: the error if any, else the length hint.
    pub fn helper_text(&self, error: Option<&str>) -> Option<String> {
        match (error, self.max_length) {
            (Some(err), _) => Some(err.to_string()),
            (None, Some(max)) => Some(format!("Max {max} characters")),
            (None, None) => None,
        }
    }
}

pub const PLACE_FIELDS: &[PlaceField] = &[
    PlaceField {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
        options: &[],
        max_length: Some(25),
    },
    PlaceField {
        name: "type",
        label: "Type",
        kind: FieldKind::Select,
        options: &["Restaurant", "Hotel", "Park"],
        max_length: None,
    },
    PlaceField {
        name: "address",
        label: "Address",
        kind: FieldKind::Text,
        options: &[],
        max_length: None,
    },
];

/// Why an edit was refused at the input level. The field keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputRejected {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("{label} is limited to {max} characters")]
    TooLong { label: &'static str, max: usize },

    #[error("'{value}' is not an option for {label}")]
    NotAnOption { label: &'static str, value: String },
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent. Errors are on the form.
    Invalid,
    /// The place was created and the form cleared.
    Created,
    /// The request failed; the entered values are kept for another try.
    Failed(PlacesError),
}

impl SubmitOutcome {
    /// Message to show the user, if the outcome calls for one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SubmitOutcome::Invalid => None,
            SubmitOutcome::Created => Some(CREATED_NOTICE),
            SubmitOutcome::Failed(_) => Some(FAILED_NOTICE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreationForm {
    fields: &'static [PlaceField],
    values: HashMap<&'static str, String>,
    errors: HashMap<&'static str, String>,
}

impl Default for CreationForm {
    fn default() -> Self {
        Self::new(PLACE_FIELDS)
    }
}

impl CreationForm {
    pub fn new(fields: &'static [PlaceField]) -> Self {
        Self {
            fields,
            values: fields.iter().map(|f| (f.name, String::new())).collect(),
            errors: HashMap::new(),
        }
    }

    pub fn fields(&self) -> &'static [PlaceField] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static PlaceField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn helper_text(&self, name: &str) -> Option<String> {
        self.field(name)?.helper_text(self.error(name))
    }

    /// A keystroke-level edit. Values past the field's limit, or outside a select's
    /// options, are refused and the field is left as it was.
    pub fn input(&mut self, name: &str, value: &str) -> Result<(), InputRejected> {
        let field = self
            .field(name)
            .ok_or_else(|| InputRejected::UnknownField(name.to_string()))?;

        if let Some(max) = field.max_length {
            if char_len(value) > max {
                return Err(InputRejected::TooLong {
                    label: field.label,
                    max,
                });
            }
        }

        if field.kind == FieldKind::Select && !value.is_empty() && !field.options.contains(&value)
        {
            return Err(InputRejected::NotAnOption {
                label: field.label,
                value: value.to_string(),
            });
        }

        self.store(field, value);
        Ok(())
    }

    /// Set a value wholesale (pasted or passed in), skipping the length limit.
    /// `validate` still checks it. Select values match their option case-insensitively
    /// and are stored in the option's spelling.
    pub fn prefill(&mut self, name: &str, value: &str) -> Result<(), InputRejected> {
        let field = self
            .field(name)
            .ok_or_else(|| InputRejected::UnknownField(name.to_string()))?;

        if field.kind == FieldKind::Select && !value.is_empty() {
            let option = field
                .options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(value.trim()))
                .ok_or_else(|| InputRejected::NotAnOption {
                    label: field.label,
                    value: value.to_string(),
                })?;
            self.store(field, option);
            return Ok(());
        }

        self.store(field, value);
        Ok(())
    }

    fn store(&mut self, field: &'static PlaceField, value: &str) {
        self.values.insert(field.name, value.to_string());
        self.errors.remove(field.name);
    }

    /// Check every field and record all errors at once. Returns whether the form is valid.
    pub fn validate(&mut self) -> bool {
        let mut errors = HashMap::new();

        for field in self.fields {
            let value = self.value(field.name);
            if value.is_empty() {
                errors.insert(field.name, format!("{} is required", field.label));
            } else if let Some(max) = field.max_length.filter(|max| char_len(value) > *max) {
                errors.insert(
                    field.name,
                    format!("{} must not exceed {} characters", field.label, max),
                );
            }
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    /// The flat body sent to `POST /place`.
    pub fn payload(&self) -> PlacePayload {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), self.value(f.name).to_string()))
            .collect()
    }

    pub fn reset(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
        self.errors.clear();
    }

    /// Validate, then send. Clears the form only when the backend accepts the place.
    pub async fn submit(&mut self, api: &dyn PlacesApi) -> SubmitOutcome {
        if !self.validate() {
            tracing::debug!(errors = self.errors.len(), "form has errors, not submitting");
            return SubmitOutcome::Invalid;
        }

        match api.create_place(&self.payload()).await {
            Ok(()) => {
                tracing::info!("place created");
                self.reset();
                SubmitOutcome::Created
            }
            Err(err) => {
                tracing::warn!(%err, "failed to create place");
                SubmitOutcome::Failed(err)
            }
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}
