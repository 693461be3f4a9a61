use serde::{Deserialize, Serialize};

use crate::domain::SequenceId;

/// Upload endpoint, relative to the server base URL.
pub const UPLOAD_PATH: &str = "/dataset/upload";
/// Where the client navigates after a successful upload.
pub const LISTING_PATH: &str = "/dataset/list";

pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "desc";
/// Fixed key the anti-forgery token is sent under, overwriting any value
/// already present in the serialized form.
pub const CSRF_FIELD: &str = "csrf_token";

/// The three inputs of one author sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorField {
    Name,
    Affiliation,
    Orcid,
}

impl AuthorField {
    pub const ALL: [AuthorField; 3] = [
        AuthorField::Name,
        AuthorField::Affiliation,
        AuthorField::Orcid,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            AuthorField::Name => "name",
            AuthorField::Affiliation => "affiliation",
            AuthorField::Orcid => "orcid",
        }
    }
}

/// Index-based key of a repeated author subform field, in the shape the
/// backend's form-decoding layer expects: `{prefix}authors-{n}-{suffix}`.
pub fn author_field_name(prefix: &str, sequence_id: SequenceId, field: AuthorField) -> String {
    format!("{prefix}authors-{sequence_id}-{}", field.suffix())
}

/// JSON body the upload endpoint answers with, on both status classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAck {
    pub message: String,
}
