//! Form state: values and per-field errors for one create/edit dialog.

use std::collections::BTreeMap;

use dpav_client::Id;

use crate::schema::Schema;
use crate::validate::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Id),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub schema: &'static Schema,
    pub mode: FormMode,
    pub values: BTreeMap<String, String>,
    /// Last message per field; the empty string means valid.
    pub errors: BTreeMap<String, String>,
    pub busy: bool,
    pub open: bool,
}

impl FormState {
    /// A closed, empty create form.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            mode: FormMode::Create,
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            busy: false,
            open: false,
        }
    }

    pub fn create(schema: &'static Schema) -> Self {
        Self { open: true, ..Self::new(schema) }
    }

    /// Open in edit mode prefilled with `values`; no errors are shown until
    /// the user touches a field or submits.
    pub fn edit(schema: &'static Schema, id: Id, values: BTreeMap<String, String>) -> Self {
        Self {
            mode: FormMode::Edit(id),
            values,
            open: true,
            ..Self::new(schema)
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str).filter(|e| !e.is_empty())
    }

    /// Store a new value and re-check that field only.
    pub fn set_field(&mut self, name: &str, raw: &str) {
        let value = self.schema.sanitize(name, raw);
        let error = validate(self.schema, name, &value);
        self.values.insert(name.to_string(), value);
        self.errors.insert(name.to_string(), error);
    }

    /// Check every schema field against its current value. Returns whether
    /// the form is valid.
    pub fn revalidate(&mut self) -> bool {
        for spec in self.schema.fields {
            let error = spec.rule.check(self.value(spec.name));
            self.errors.insert(spec.name.to_string(), error);
        }
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|e| !e.is_empty())
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.schema
            .names()
            .filter(|n| self.value(n).trim().is_empty())
            .collect()
    }

    /// Whether the submit control is enabled: no visible errors, every field
    /// filled, and no request in flight.
    pub fn can_submit(&self) -> bool {
        !self.busy && !self.has_errors() && self.missing().is_empty()
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }
}
