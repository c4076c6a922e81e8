//! Flavor-to-context naming
//!
//! Every distinct flavor referenced by a composition gets exactly one
//! short context name, derived from the flavor descriptor with characters
//! unsafe in identifiers replaced. Collisions are disambiguated with a
//! numeric suffix, never silently merged. The map is computed once per
//! composition pass and reused for every dependent lookup.

use std::collections::HashSet;

use super::flavor::Flavor;

/// Immutable flavor → context-name mapping for one composition pass
#[derive(Debug, Clone, Default)]
pub struct ContextMap {
    /// Insertion-ordered (flavor, context) pairs
    entries: Vec<(Flavor, String)>,
}

impl ContextMap {
    /// Derive context names for a set of flavors
    ///
    /// Duplicate flavors (structural equality) collapse to the first
    /// occurrence; distinct flavors always get distinct names.
    pub fn new(flavors: impl IntoIterator<Item = Flavor>) -> Self {
        let mut entries: Vec<(Flavor, String)> = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for flavor in flavors {
            if entries.iter().any(|(seen, _)| *seen == flavor) {
                continue;
            }
            // Distinct flavors whose descriptors collide after sanitizing
            // still need distinct contexts. A suffixed candidate may itself
            // collide with another flavor's natural descriptor (`x86-2` is
            // a legal arch token), so every candidate is re-checked.
            let base = sanitize(&flavor.descriptor());
            let mut name = base.clone();
            let mut count = 1;
            while taken.contains(&name) {
                count += 1;
                name = format!("{base}-{count}");
            }
            taken.insert(name.clone());
            entries.push((flavor, name));
        }

        Self { entries }
    }

    /// Context name for a flavor, if the flavor is part of this pass
    pub fn context_for(&self, flavor: &Flavor) -> Option<&str> {
        self.entries
            .iter()
            .find(|(seen, _)| seen == flavor)
            .map(|(_, name)| name.as_str())
    }

    /// All context names, in derivation order
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name)| name.as_str())
    }

    /// All (flavor, context) pairs, in derivation order
    pub fn iter(&self) -> impl Iterator<Item = (&Flavor, &str)> {
        self.entries
            .iter()
            .map(|(flavor, name)| (flavor, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace characters unsafe in config sections and filenames
///
/// Commas, spaces, and flavor punctuation all become `_`. An empty
/// descriptor (the empty flavor) maps to `default`.
fn sanitize(descriptor: &str) -> String {
    if descriptor.is_empty() {
        return "default".to_string();
    }
    descriptor
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
