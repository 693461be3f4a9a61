//! Pre-submission checks. Every check always runs, so one pass surfaces
//! every problem at once.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{authors::AuthorRoster, fields::FieldFragment};

pub const MIN_BASIC_FIELD_LEN: usize = 3;

pub const TITLE_TOO_SHORT: &str = "title must be of minimum length 3";
pub const DESCRIPTION_TOO_SHORT: &str = "description must be of minimum length 3";
pub const AUTHOR_NAME_EMPTY: &str = "The author's name cannot be empty";

static ORCID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{4}$").expect("orcid pattern"));

/// Four hyphen-separated four-digit groups, nothing else.
pub fn is_valid_orcid(orcid: &str) -> bool {
    ORCID_PATTERN.is_match(orcid)
}

/// Messages collected by one validation pass. Built once, then read-only.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

/// Runs the basic-field and per-author checks without short-circuiting.
/// Failing basic fields are visually flagged; author problems are only
/// reported. Identifier fields may be empty, but a non-empty value must
/// match the strict format.
pub fn validate_form(
    title: &mut FieldFragment,
    description: &mut FieldFragment,
    authors: &AuthorRoster,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    title.flagged = false;
    description.flagged = false;

    if title.trimmed().chars().count() < MIN_BASIC_FIELD_LEN {
        report.push(TITLE_TOO_SHORT);
        title.flagged = true;
    }
    if description.trimmed().chars().count() < MIN_BASIC_FIELD_LEN {
        report.push(DESCRIPTION_TOO_SHORT);
        description.flagged = true;
    }

    for unit in authors.units() {
        let orcid = unit.orcid.trimmed();
        if !orcid.is_empty() && !is_valid_orcid(orcid) {
            report.push(format!(
                "ORCID value does not conform to valid format: {orcid}"
            ));
        }
    }

    for unit in authors.units() {
        if unit.name.trimmed().is_empty() {
            report.push(AUTHOR_NAME_EMPTY);
        }
    }

    report
}
