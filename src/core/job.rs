//! Build jobs and per-context build configuration
//!
//! A [`Job`] is the unit handed to the build orchestrator: an ordered
//! trove list tagged with contexts, one [`BuildConfig`] per context, and
//! the primary-target bookkeeping. Jobs are mutable while a composition
//! pass assembles them; once overlaid they are submitted as a whole.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::flavor::Flavor;
use crate::core::label::Label;
use crate::core::spec::{JobEntry, TroveSpec, TroveTup};

/// Per-context build configuration, built once per composition pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Context this configuration belongs to
    pub context: String,
    /// The context's flavor
    pub flavor: Flavor,
    /// Flavor the builds run under (base merged with overrides)
    pub build_flavor: Flavor,
    /// Rendered build-target strings for this context
    #[serde(default)]
    pub build_specs: Vec<String>,
    /// Candidate-trove group lists for dependency resolution, in priority
    /// order
    #[serde(default)]
    pub resolve_troves: Vec<Vec<TroveSpec>>,
    /// Labels consulted when installing build requirements
    #[serde(default)]
    pub install_label_path: Vec<Label>,
    /// Macro overrides
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

/// A composed (or orchestrator-side) build job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Ordered trove list with contexts
    #[serde(default)]
    pub trove_list: Vec<JobEntry>,
    /// Per-context build configuration
    #[serde(default)]
    pub configs: BTreeMap<String, BuildConfig>,
    /// Prebuilt binaries the orchestrator may reuse instead of rebuilding
    #[serde(default)]
    pub prebuilt_binaries: Vec<TroveTup>,
    /// What this invocation is primarily trying to build
    #[serde(default)]
    pub primary_targets: Vec<JobEntry>,
}

impl Job {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trove entry (duplicates by identity are acceptable; the
    /// orchestrator deduplicates trove identity, not spec identity)
    pub fn add_entry(&mut self, entry: JobEntry) {
        self.trove_list.push(entry);
    }

    /// Insert a context configuration, replacing any previous one
    pub fn set_config(&mut self, config: BuildConfig) {
        self.configs.insert(config.context.clone(), config);
    }

    /// Configuration for a context
    pub fn config(&self, context: &str) -> Option<&BuildConfig> {
        self.configs.get(context)
    }

    /// Add a prebuilt binary, keeping the list duplicate-free
    pub fn add_prebuilt(&mut self, trove: TroveTup) {
        if !self.prebuilt_binaries.contains(&trove) {
            self.prebuilt_binaries.push(trove);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trove_list.is_empty()
    }

    /// Overlay `other` onto this job
    ///
    /// - every trove entry of `other` is appended;
    /// - for contexts present in both jobs, `other`'s build-spec list is
    ///   appended after this job's (earlier entries keep priority);
    /// - contexts present only in `other` contribute no configuration:
    ///   this job's per-context configuration stays authoritative;
    /// - prebuilt binaries are a set union;
    /// - primary targets are replaced by `other`'s full trove list.
    pub fn overlay(&mut self, other: Job) {
        self.trove_list.extend(other.trove_list.iter().cloned());

        for (context, config) in &other.configs {
            if let Some(existing) = self.configs.get_mut(context) {
                existing
                    .build_specs
                    .extend(config.build_specs.iter().cloned());
            }
        }

        for trove in other.prebuilt_binaries {
            self.add_prebuilt(trove);
        }

        self.primary_targets = other.trove_list;
    }
}

/// Merge two partially-built jobs into one
///
/// With no base job, the overlay becomes the whole job.
pub fn overlay(base: Option<Job>, other: Job) -> Job {
    match base {
        Some(mut job) => {
            job.overlay(other);
            job
        }
        None => other,
    }
}
