//! Point-in-time serialization of the form, taken once validation passes
//! and discarded when the request resolves.

use reqwest::multipart;
use shared::protocol::{AuthorField, DESCRIPTION_FIELD, TITLE_FIELD};

use crate::{authors::AuthorRoster, fields::FieldFragment};

/// Ordered (field-name, value) pairs: title, description, then each
/// attached author's three fields under its own sequence id. Ids are not
/// necessarily contiguous after removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn capture(
        title: &FieldFragment,
        description: &FieldFragment,
        authors: &AuthorRoster,
    ) -> Self {
        let mut fields = vec![
            (TITLE_FIELD.to_string(), title.value.clone()),
            (DESCRIPTION_FIELD.to_string(), description.value.clone()),
        ];
        for unit in authors.units() {
            for field in AuthorField::ALL {
                let fragment = unit.field(field);
                fields.push((fragment.name.clone(), fragment.value.clone()));
            }
        }
        Self { fields }
    }

    /// Overwrites the value under `name`, or appends it if absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn into_multipart(self) -> multipart::Form {
        let mut form = multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        form
    }
}
