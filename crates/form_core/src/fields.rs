//! Detached view-model fragments for labeled inputs and author blocks.

use shared::{
    domain::SequenceId,
    protocol::{author_field_name, AuthorField},
};

/// One label bound to one text input. Front ends render these; the
/// controller mutates `value` on keystrokes and `flagged` on validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFragment {
    pub name: String,
    pub label: String,
    pub value: String,
    pub flagged: bool,
}

impl FieldFragment {
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

/// Builds a detached fragment for one labeled input. Pure construction.
pub fn render_field(name: impl Into<String>, label: impl Into<String>) -> FieldFragment {
    FieldFragment {
        name: name.into(),
        label: label.into(),
        value: String::new(),
        flagged: false,
    }
}

/// One author record's three inputs, keyed by its sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorUnit {
    sequence_id: SequenceId,
    pub name: FieldFragment,
    pub affiliation: FieldFragment,
    pub orcid: FieldFragment,
}

/// Composes the three author fields under the repeated-subform naming
/// scheme, e.g. `authors-4-name` for sequence id 4.
pub fn author_block(sequence_id: SequenceId, name_prefix: &str) -> AuthorUnit {
    AuthorUnit {
        sequence_id,
        name: render_field(
            author_field_name(name_prefix, sequence_id, AuthorField::Name),
            "Name *",
        ),
        affiliation: render_field(
            author_field_name(name_prefix, sequence_id, AuthorField::Affiliation),
            "Affiliation",
        ),
        orcid: render_field(
            author_field_name(name_prefix, sequence_id, AuthorField::Orcid),
            "ORCID",
        ),
    }
}

impl AuthorUnit {
    pub fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }

    pub fn field(&self, field: AuthorField) -> &FieldFragment {
        match field {
            AuthorField::Name => &self.name,
            AuthorField::Affiliation => &self.affiliation,
            AuthorField::Orcid => &self.orcid,
        }
    }

    pub fn field_mut(&mut self, field: AuthorField) -> &mut FieldFragment {
        match field {
            AuthorField::Name => &mut self.name,
            AuthorField::Affiliation => &mut self.affiliation,
            AuthorField::Orcid => &mut self.orcid,
        }
    }
}
