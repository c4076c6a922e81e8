//! Product definition (product.toml) parsing and validation
//!
//! The product definition declares everything a composition pass reads:
//! stages bound to repository labels, the upstream search path, and the
//! build definitions (image groups with per-definition flavor overrides).
//! It is read-only input; one file per product checkout.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::flavor::Flavor;
use crate::core::label::Label;
use crate::core::searchpath::SearchPathEntry;
use crate::core::spec::is_group;
use crate::error::ProductError;

/// The product definition (product.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDefinition {
    /// Product-level settings
    pub product: ProductMeta,

    /// Pipeline stages, each bound to a repository label
    #[serde(default)]
    pub stages: Vec<Stage>,

    /// Prioritized upstream sources for package lookup
    #[serde(default)]
    pub search_path: Vec<SearchPathEntry>,

    /// Declared build targets
    #[serde(default)]
    pub builds: Vec<BuildDefinition>,

    /// Macro defaults passed through to every build configuration
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

/// Product-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMeta {
    /// Product name
    pub name: String,

    /// Stage the current working checkout tracks
    pub active_stage: String,

    /// Flavor every build definition starts from
    #[serde(default)]
    pub base_flavor: Option<Flavor>,
}

/// A named pipeline stage bound to a repository label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub name: String,
    pub label: Label,
}

/// One declared build target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildDefinition {
    /// Display name of the build
    pub name: String,

    /// Group whose image gets built
    pub image_group: String,

    /// Group to build from source when it differs from the image group
    #[serde(default)]
    pub source_group: Option<String>,

    /// Flavor override applied on top of the product base flavor
    #[serde(default)]
    pub flavor: Option<Flavor>,

    /// Stages this build participates in (empty means all)
    #[serde(default)]
    pub stages: Vec<String>,
}

impl BuildDefinition {
    /// The group this definition builds (source group when present)
    pub fn build_group(&self) -> &str {
        self.source_group.as_deref().unwrap_or(&self.image_group)
    }

    /// Whether this build participates in a stage
    pub fn active_in(&self, stage: &str) -> bool {
        self.stages.is_empty() || self.stages.iter().any(|s| s == stage)
    }
}

impl ProductDefinition {
    /// Load and validate a product definition from disk
    pub fn load(path: &Path) -> Result<Self, ProductError> {
        if !path.exists() {
            return Err(ProductError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| ProductError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a product definition
    pub fn from_toml(content: &str) -> Result<Self, ProductError> {
        let product: Self =
            toml::from_str(content).map_err(|source| ProductError::ParseError { source })?;
        product.validate()?;
        Ok(product)
    }

    fn validate(&self) -> Result<(), ProductError> {
        if self.stages.is_empty() {
            return Err(ProductError::Validation {
                message: "at least one stage is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.name.as_str()) {
                return Err(ProductError::Validation {
                    message: format!("duplicate stage '{}'", stage.name),
                });
            }
        }

        if self.stage(&self.product.active_stage).is_none() {
            return Err(ProductError::UnknownStage {
                stage: self.product.active_stage.clone(),
            });
        }

        for build in &self.builds {
            if !is_group(&build.image_group) {
                return Err(ProductError::Validation {
                    message: format!(
                        "build '{}': image group '{}' must be a group- name",
                        build.name, build.image_group
                    ),
                });
            }
            for stage in &build.stages {
                if self.stage(stage).is_none() {
                    return Err(ProductError::Validation {
                        message: format!("build '{}': unknown stage '{stage}'", build.name),
                    });
                }
            }
        }

        Ok(())
    }

    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// The stage the current checkout tracks
    pub fn active_stage(&self) -> &Stage {
        // Validation guarantees the active stage is declared.
        self.stage(&self.product.active_stage)
            .expect("active stage validated at load")
    }

    /// Resolved flavor for one build definition
    ///
    /// The product base flavor with the definition's override merged on
    /// top; override flags win on conflict.
    pub fn build_flavor(&self, build: &BuildDefinition) -> Flavor {
        let base = self.product.base_flavor.clone().unwrap_or_default();
        match &build.flavor {
            Some(over) => base.merged_with(over),
            None => base,
        }
    }

    /// Every resolved flavor, in build-definition order (with duplicates)
    pub fn flavors(&self) -> Vec<Flavor> {
        self.builds.iter().map(|b| self.build_flavor(b)).collect()
    }

    /// Distinct (group, flavor) pairs to build for a stage
    pub fn group_pairs(&self, stage: &str) -> Vec<(String, Flavor)> {
        let mut pairs: Vec<(String, Flavor)> = Vec::new();
        for build in self.builds.iter().filter(|b| b.active_in(stage)) {
            let pair = (build.build_group().to_string(), self.build_flavor(build));
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Labels consulted during dependency resolution: the active stage
    /// label first, then the search path labels in priority order
    pub fn install_label_path(&self) -> Vec<Label> {
        let mut labels = vec![self.active_stage().label.clone()];
        for entry in &self.search_path {
            if !labels.contains(&entry.label) {
                labels.push(entry.label.clone());
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[product]
name = "appliance"
active_stage = "devel"
base_flavor = "ssl"

[[stages]]
name = "devel"
label = "products.example.com@ex:devel"

[[stages]]
name = "qa"
label = "products.example.com@ex:qa"

[[search_path]]
group = "group-os"
label = "repo.example.com@ex:2"

[[search_path]]
label = "repo.example.com@ex:contrib"

[[builds]]
name = "server x86"
image_group = "group-server-dist"
flavor = "is: x86"

[[builds]]
name = "server x86_64"
image_group = "group-server-dist"
source_group = "group-server"
flavor = "is: x86_64"
stages = ["devel"]
"#;

    #[test]
    fn test_parse_sample() {
        let product = ProductDefinition::from_toml(SAMPLE).unwrap();
        assert_eq!(product.product.name, "appliance");
        assert_eq!(product.stages.len(), 2);
        assert_eq!(product.search_path.len(), 2);
        assert_eq!(product.builds.len(), 2);
        assert_eq!(product.active_stage().name, "devel");
    }

    #[test]
    fn test_build_flavor_merges_base_and_override() {
        let product = ProductDefinition::from_toml(SAMPLE).unwrap();
        let flavor = product.build_flavor(&product.builds[0]);
        assert_eq!(flavor, Flavor::parse("ssl is: x86").unwrap());
    }

    #[test]
    fn test_group_pairs_respect_source_group_and_stage() {
        let product = ProductDefinition::from_toml(SAMPLE).unwrap();
        let devel = product.group_pairs("devel");
        assert_eq!(
            devel,
            vec![
                (
                    "group-server-dist".to_string(),
                    Flavor::parse("ssl is: x86").unwrap()
                ),
                (
                    "group-server".to_string(),
                    Flavor::parse("ssl is: x86_64").unwrap()
                ),
            ]
        );

        // The x86_64 build is devel-only.
        let qa = product.group_pairs("qa");
        assert_eq!(qa.len(), 1);
    }

    #[test]
    fn test_validation_rejects_unknown_active_stage() {
        let bad = SAMPLE.replace("active_stage = \"devel\"", "active_stage = \"prod\"");
        assert!(matches!(
            ProductDefinition::from_toml(&bad),
            Err(ProductError::UnknownStage { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_non_group_image() {
        let bad = SAMPLE.replace("image_group = \"group-server-dist\"", "image_group = \"server\"");
        assert!(ProductDefinition::from_toml(&bad).is_err());
    }

    #[test]
    fn test_install_label_path_order() {
        let product = ProductDefinition::from_toml(SAMPLE).unwrap();
        let labels: Vec<String> = product
            .install_label_path()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            labels,
            vec![
                "products.example.com@ex:devel",
                "repo.example.com@ex:2",
                "repo.example.com@ex:contrib",
            ]
        );
    }
}
