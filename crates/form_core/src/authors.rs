use shared::domain::SequenceId;
use tracing::info;

use crate::fields::{author_block, AuthorUnit};

/// Owns the author units currently attached to the form. The sequence
/// counter only ever increments, so a removed record's id is never handed
/// to a later one and field names stay collision-free after removals.
#[derive(Debug, Clone)]
pub struct AuthorRoster {
    next_sequence_id: u64,
    name_prefix: String,
    units: Vec<AuthorUnit>,
}

impl AuthorRoster {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            next_sequence_id: 0,
            name_prefix: name_prefix.into(),
            units: Vec::new(),
        }
    }

    /// Attaches a fresh author unit and returns its sequence id.
    pub fn add_author(&mut self) -> SequenceId {
        let sequence_id = SequenceId(self.next_sequence_id);
        self.next_sequence_id += 1;
        self.units.push(author_block(sequence_id, &self.name_prefix));
        info!(sequence_id = sequence_id.0, "authors: record attached");
        sequence_id
    }

    /// Detaches the unit with the given id. Detaching an id that is not
    /// attached (already removed, or never assigned) is a no-op.
    pub fn remove_author(&mut self, sequence_id: SequenceId) -> bool {
        let before = self.units.len();
        self.units.retain(|unit| unit.sequence_id() != sequence_id);
        let removed = self.units.len() != before;
        if removed {
            info!(sequence_id = sequence_id.0, "authors: record detached");
        }
        removed
    }

    pub fn units(&self) -> &[AuthorUnit] {
        &self.units
    }

    pub fn unit_mut(&mut self, sequence_id: SequenceId) -> Option<&mut AuthorUnit> {
        self.units
            .iter_mut()
            .find(|unit| unit.sequence_id() == sequence_id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
