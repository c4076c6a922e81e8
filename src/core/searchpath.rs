//! Search path entries
//!
//! A product's search path is an ordered list of upstream sources for
//! package lookup. An entry either points at a label directly or at a
//! named group on a label ("look inside this group"). List order encodes
//! lookup priority: the first entry that yields a match wins.

use serde::{Deserialize, Serialize};

use super::flavor::Flavor;
use super::label::Label;
use super::spec::TroveSpec;

/// One prioritized upstream source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchPathEntry {
    /// Group to look inside; `None` means look directly on the label
    #[serde(default)]
    pub group: Option<String>,
    /// Label the group or packages live on
    pub label: Label,
    /// Flavor constraint for the lookup
    #[serde(default)]
    pub flavor: Option<Flavor>,
}

impl SearchPathEntry {
    /// Direct-label entry
    pub fn label(label: Label) -> Self {
        Self {
            group: None,
            label,
            flavor: None,
        }
    }

    /// Inside-group entry
    pub fn group(name: impl Into<String>, label: Label) -> Self {
        Self {
            group: Some(name.into()),
            label,
            flavor: None,
        }
    }

    #[must_use]
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    /// The spec this entry's own group resolves with, if it is one
    pub fn group_spec(&self) -> Option<TroveSpec> {
        self.group.as_ref().map(|name| {
            TroveSpec::new(
                name.clone(),
                Some(self.label.to_string()),
                self.flavor.clone(),
            )
        })
    }

    /// The spec a direct-label lookup of `package` uses through this entry
    pub fn package_spec(&self, package: &str) -> TroveSpec {
        TroveSpec::new(
            package,
            Some(self.label.to_string()),
            self.flavor.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devel() -> Label {
        Label::parse("repo.example.com@ex:devel").unwrap()
    }

    #[test]
    fn test_group_spec_only_for_group_entries() {
        let direct = SearchPathEntry::label(devel());
        assert!(direct.group_spec().is_none());

        let grouped = SearchPathEntry::group("group-os", devel());
        let spec = grouped.group_spec().unwrap();
        assert_eq!(spec.name, "group-os");
        assert_eq!(spec.version.as_deref(), Some("repo.example.com@ex:devel"));
    }

    #[test]
    fn test_package_spec_carries_entry_flavor() {
        let entry = SearchPathEntry::label(devel())
            .with_flavor(Flavor::parse("is: x86").unwrap());
        let spec = entry.package_spec("foo");
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.flavor, Some(Flavor::parse("is: x86").unwrap()));
    }
}
