use serde::{Deserialize, Serialize};

/// Key of one repeatable author sub-record. Assigned from a monotonically
/// increasing counter and never reused, so removed records leave gaps
/// instead of shifting later records onto their keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
