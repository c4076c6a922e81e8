//! Local checkout discovery
//!
//! A package or group counts as "edited" when a checkout of it exists
//! under the project's checkouts directory: `checkouts/<name>/<name>.recipe`.
//! The scan result maps trove name to the recipe path; planners consult
//! it to decide between local and repository builds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::defaults;
use crate::core::spec::is_group;
use crate::error::CheckoutError;

/// Names of locally checked-out troves mapped to their recipe files
#[derive(Debug, Clone, Default)]
pub struct CheckoutSet {
    recipes: BTreeMap<String, PathBuf>,
}

impl CheckoutSet {
    /// Scan `<project>/checkouts/` for recipes
    ///
    /// A missing checkouts directory yields an empty set, not an error:
    /// "nothing edited" is a normal state.
    pub fn scan(project_dir: &Path) -> Result<Self, CheckoutError> {
        let root = project_dir.join(defaults::CHECKOUTS_DIR);
        let mut recipes = BTreeMap::new();
        if !root.is_dir() {
            return Ok(Self { recipes });
        }

        for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| CheckoutError::Scan {
                path: root.clone(),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let recipe = entry
                .path()
                .join(format!("{name}.{}", defaults::RECIPE_EXT));
            if recipe.is_file() {
                recipes.insert(name.to_string(), recipe);
            }
        }

        Ok(Self { recipes })
    }

    /// Build a set directly from (name, path) pairs
    pub fn from_recipes(recipes: BTreeMap<String, PathBuf>) -> Self {
        Self { recipes }
    }

    /// Recipe path for a checked-out trove
    pub fn recipe(&self, name: &str) -> Option<&PathBuf> {
        self.recipes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// All checked-out names with paths, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathBuf)> {
        self.recipes.iter()
    }

    /// Checked-out groups only
    pub fn groups(&self) -> BTreeMap<String, PathBuf> {
        self.recipes
            .iter()
            .filter(|(name, _)| is_group(name))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }

    /// Checked-out packages only (everything that is not a group)
    pub fn packages(&self) -> BTreeMap<String, PathBuf> {
        self.recipes
            .iter()
            .filter(|(name, _)| !is_group(name))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }
}
