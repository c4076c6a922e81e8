//! Trove versions
//!
//! A trove version pairs a repository label with a source revision plus the
//! repository commit serial. The serial is the total order the repository
//! assigns to commits; "highest version" everywhere in planning means
//! highest serial, with revision and label as deterministic tie-breaks.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::label::Label;

/// A fully qualified trove version (`/host@ns:tag/revision`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Label the version was committed on
    pub label: Label,
    /// Source revision string, e.g. `1.2-3`
    pub revision: String,
    /// Repository commit ordinal; higher means newer
    pub serial: u64,
}

impl Version {
    /// Build a version from its parts
    pub fn new(label: Label, revision: impl Into<String>, serial: u64) -> Self {
        Self {
            label,
            revision: revision.into(),
            serial,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.label, self.revision)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.serial
            .cmp(&other.serial)
            .then_with(|| self.revision.cmp(&other.revision))
            .then_with(|| self.label.cmp(&other.label))
    }
}
