//! Package repository collaborator
//!
//! The planner only needs two operations from the repository: batched
//! allow-missing trove lookup and deep group-content iteration. The
//! [`Repository`] trait captures that contract; [`client`] implements it
//! over HTTP.

pub mod client;

use std::collections::{HashMap, HashSet};

use crate::core::label::Label;
use crate::core::spec::{TroveSpec, TroveTup};
use crate::error::RepoError;

/// Result of a batched allow-missing lookup
///
/// "Not found" is an explicit outcome, not an absent key: every input spec
/// lands in `found` or in `missing`.
#[derive(Debug, Clone, Default)]
pub struct FindResult {
    /// Matches per input spec, repository order preserved per key
    pub found: HashMap<TroveSpec, Vec<TroveTup>>,
    /// Input specs that matched nothing
    pub missing: HashSet<TroveSpec>,
}

impl FindResult {
    /// Matches for one input spec (empty slice when missing)
    pub fn matches(&self, spec: &TroveSpec) -> &[TroveTup] {
        self.found.get(spec).map_or(&[], Vec::as_slice)
    }

    /// Highest-version match for one input spec
    ///
    /// Deterministic: max by version (commit serial), trove name as the
    /// final tie-break. The original system took whichever match the
    /// repository happened to return last.
    pub fn best(&self, spec: &TroveSpec) -> Option<&TroveTup> {
        self.matches(spec)
            .iter()
            .max_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)))
    }

    pub fn is_missing(&self, spec: &TroveSpec) -> bool {
        self.missing.contains(spec)
    }
}

/// Trove lookup contract the planner requires
pub trait Repository {
    /// Batched trove lookup
    ///
    /// With `allow_missing`, specs that match nothing land in
    /// [`FindResult::missing`]; without it the first miss is an error.
    /// `search_labels` are candidate labels for specs that do not pin one.
    fn find_troves(
        &self,
        specs: &[TroveSpec],
        search_labels: &[Label],
        allow_missing: bool,
    ) -> impl std::future::Future<Output = Result<FindResult, RepoError>> + Send;

    /// Deep contents of a group: strong and weak members, direct and
    /// indirect
    fn trove_contents(
        &self,
        trove: &TroveTup,
    ) -> impl std::future::Future<Output = Result<Vec<TroveTup>, RepoError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flavor::Flavor;
    use crate::core::version::Version;

    fn tup(name: &str, serial: u64) -> TroveTup {
        TroveTup::new(
            name,
            Version::new(
                Label::parse("repo.example.com@ex:devel").unwrap(),
                format!("1.0-{serial}"),
                serial,
            ),
            Flavor::empty(),
        )
    }

    #[test]
    fn test_best_is_deterministic_max_by_version() {
        let spec = TroveSpec::by_name("group-os");
        let mut result = FindResult::default();
        result
            .found
            .insert(spec.clone(), vec![tup("group-os", 3), tup("group-os", 9), tup("group-os", 5)]);

        assert_eq!(result.best(&spec).unwrap().version.serial, 9);
    }

    #[test]
    fn test_missing_specs_are_explicit() {
        let spec = TroveSpec::by_name("nowhere");
        let mut result = FindResult::default();
        result.missing.insert(spec.clone());

        assert!(result.is_missing(&spec));
        assert!(result.matches(&spec).is_empty());
        assert!(result.best(&spec).is_none());
    }
}
