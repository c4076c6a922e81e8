//! Edited-package overlay planning
//!
//! Given the main job and the set of locally edited packages, replace
//! every superseded job entry with a local-recipe build that preserves
//! the original entry's flavor and context. Group entries are always
//! stripped from the main job: their membership goes stale the moment
//! packages underneath them rebuild from source.
//!
//! Edited packages not referenced by any group in the job fall back to
//! one build per known product context; that is a degraded path (no
//! flavor could be inferred) and is reported loudly but never fails the
//! composition.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::core::context::ContextMap;
use crate::core::flavor::Flavor;
use crate::core::job::Job;
use crate::core::spec::{base_name, is_group, BuildTarget};
use crate::error::PlanError;

/// Result of an overlay planning pass
#[derive(Debug, Default)]
pub struct OverlayOutcome {
    /// Replacement build targets for the edited packages
    pub targets: Vec<BuildTarget>,
    /// Packages that took the every-context fallback, sorted
    pub fallback: Vec<String>,
}

/// Replace edited packages inside `main_job`
///
/// Mutates the job in place: superseded entries and all group entries are
/// removed. On error the job may already be partially mutated; callers
/// treat the whole composition as atomic-or-discard.
pub fn overlay_edited(
    main_job: &mut Job,
    edited: &BTreeMap<String, PathBuf>,
    contexts: &ContextMap,
) -> Result<OverlayOutcome, PlanError> {
    let mut outcome = OverlayOutcome::default();
    let mut placed: HashSet<String> = HashSet::new();
    let mut emitted: HashSet<(String, Flavor, String)> = HashSet::new();

    let mut kept = Vec::with_capacity(main_job.trove_list.len());
    for entry in main_job.trove_list.drain(..) {
        let base = base_name(&entry.name).to_string();
        if let Some(path) = edited.get(&base) {
            // Superseded entry: replace it, keeping the original flavor
            // and context exactly. Components of one package collapse to
            // a single replacement per (flavor, context).
            placed.insert(base.clone());
            if emitted.insert((base, entry.flavor.clone(), entry.context.clone())) {
                let flavor = (!entry.flavor.is_empty()).then(|| entry.flavor.clone());
                outcome.targets.push(BuildTarget::Recipe {
                    path: path.clone(),
                    flavor,
                    context: entry.context,
                });
            }
            continue;
        }
        if is_group(&entry.name) {
            continue;
        }
        kept.push(entry);
    }
    main_job.trove_list = kept;

    let unplaced: Vec<(&String, &PathBuf)> = edited
        .iter()
        .filter(|(name, _)| !placed.contains(*name))
        .collect();

    if !unplaced.is_empty() {
        if contexts.is_empty() {
            return Err(PlanError::Configuration {
                message: "no image flavors defined; cannot choose a build flavor for \
                          packages outside any group"
                    .to_string(),
            });
        }
        for (name, path) in unplaced {
            tracing::warn!(
                "{name} is not in any built group; building it for every known context"
            );
            outcome.fallback.push(name.clone());
            for context in contexts.contexts() {
                outcome.targets.push(BuildTarget::Recipe {
                    path: path.clone(),
                    flavor: None,
                    context: context.to_string(),
                });
            }
        }
        outcome.fallback.sort();
    }

    Ok(outcome)
}
