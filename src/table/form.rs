use std::collections::BTreeMap;

use thiserror::Error;

use super::RecordId;
use crate::utils::parse_bool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select(&'static [&'static str]),
    Checkbox,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select(options),
            required: false,
        }
    }

    pub const fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Checkbox,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// Field values typed into the add/edit modal, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft(BTreeMap<&'static str, FieldValue>);

impl Draft {
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.0.insert(name, value);
    }

    pub fn with_text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.insert(name, FieldValue::Text(value.into()));
        self
    }

    pub fn with_flag(mut self, name: &'static str, value: bool) -> Self {
        self.insert(name, FieldValue::Flag(value));
        self
    }

    pub fn text(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => s.clone(),
            Some(FieldValue::Flag(b)) => b.to_string(),
            None => String::new(),
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(FieldValue::Flag(true)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&&'static str, &FieldValue)> {
        self.0.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSpec {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.name.eq_ignore_ascii_case(name))
    }

    pub fn empty_draft(&self) -> Draft {
        let mut draft = Draft::default();
        for field in self.fields {
            let value = match field.kind {
                FieldKind::Checkbox => FieldValue::Flag(false),
                _ => FieldValue::Text(String::new()),
            };
            draft.insert(field.name, value);
        }
        draft
    }

    pub fn missing_required(&self, draft: &Draft) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && !matches!(f.kind, FieldKind::Checkbox))
            .filter(|f| draft.text(f.name).trim().is_empty())
            .map(|f| f.label)
            .collect()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("required fields missing: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("'{value}' is not an option for {field} (choose one of: {})", .options.join(", "))]
    InvalidOption {
        field: &'static str,
        value: String,
        options: &'static [&'static str],
    },

    #[error("'{value}' is not a yes/no value for {field}")]
    InvalidFlag { field: &'static str, value: String },

    #[error("no form is open")]
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit(RecordId),
}

/// The add/edit modal of a screen.
///
/// A failed submit leaves the modal open with the draft intact. A successful
/// submit hands the draft back and resets the modal.
#[derive(Clone, Debug)]
pub struct Modal {
    spec: FormSpec,
    mode: Option<ModalMode>,
    draft: Draft,
}

impl Modal {
    pub fn new(spec: FormSpec) -> Self {
        let draft = spec.empty_draft();
        Self {
            spec,
            mode: None,
            draft,
        }
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn mode(&self) -> Option<ModalMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn open_add(&mut self) {
        self.draft = self.spec.empty_draft();
        self.mode = Some(ModalMode::Add);
    }

    pub fn open_edit(&mut self, id: RecordId, draft: Draft) {
        let mut merged = self.spec.empty_draft();
        for (name, value) in draft.iter() {
            merged.insert(*name, value.clone());
        }
        self.draft = merged;
        self.mode = Some(ModalMode::Edit(id));
    }

    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        if !self.is_open() {
            return Err(FormError::Closed);
        }
        let (name, value) = self.parse_value(name, raw)?;
        self.draft.insert(name, value);
        Ok(())
    }

    /// Sets several fields at once. Every value is checked first, so a bad
    /// one leaves the draft untouched.
    pub fn set_all(&mut self, assignments: &[(String, String)]) -> Result<(), FormError> {
        if !self.is_open() {
            return Err(FormError::Closed);
        }
        let parsed = assignments
            .iter()
            .map(|(name, raw)| self.parse_value(name, raw))
            .collect::<Result<Vec<_>, _>>()?;
        for (name, value) in parsed {
            self.draft.insert(name, value);
        }
        Ok(())
    }

    fn parse_value(
        &self,
        name: &str,
        raw: &str,
    ) -> Result<(&'static str, FieldValue), FormError> {
        let field = *self
            .spec
            .field(name)
            .ok_or_else(|| FormError::UnknownField {
                name: name.to_string(),
            })?;
        let value = match field.kind {
            FieldKind::Text => FieldValue::Text(raw.to_string()),
            FieldKind::Select(options) => {
                let chosen = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(raw.trim()))
                    .ok_or_else(|| FormError::InvalidOption {
                        field: field.label,
                        value: raw.to_string(),
                        options,
                    })?;
                FieldValue::Text((*chosen).to_string())
            }
            FieldKind::Checkbox => {
                let flag = parse_bool(raw).ok_or_else(|| FormError::InvalidFlag {
                    field: field.label,
                    value: raw.to_string(),
                })?;
                FieldValue::Flag(flag)
            }
        };
        Ok((field.name, value))
    }

    pub fn submit(&mut self) -> Result<(ModalMode, Draft), FormError> {
        let mode = self.mode.ok_or(FormError::Closed)?;
        let missing = self.spec.missing_required(&self.draft);
        if !missing.is_empty() {
            return Err(FormError::MissingFields { fields: missing });
        }
        let draft = std::mem::replace(&mut self.draft, self.spec.empty_draft());
        self.mode = None;
        Ok((mode, draft))
    }

    pub fn close(&mut self) {
        self.mode = None;
        self.draft = self.spec.empty_draft();
    }
}
