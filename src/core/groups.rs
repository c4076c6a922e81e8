//! Group build planning
//!
//! For every (group, flavor) pair a product declares, decide what gets
//! built: the locally checked-out recipe when the group is edited,
//! otherwise the repository HEAD of `<group>:source` on the active stage
//! label. Repository lookups are batched into a single round trip for all
//! groups; groups with neither an edit nor a repository hit contribute no
//! target.

use std::collections::{HashMap, HashSet};

use crate::core::checkout::CheckoutSet;
use crate::core::context::ContextMap;
use crate::core::flavor::Flavor;
use crate::core::label::Label;
use crate::core::spec::{source_name, BuildTarget, TroveSpec};
use crate::error::RepoError;
use crate::repo::Repository;

/// Plan build targets for (group, flavor) pairs
///
/// An empty result means "nothing to build"; whether that is fatal is the
/// caller's decision.
pub async fn plan<R: Repository>(
    repo: &R,
    stage_label: &Label,
    pairs: &[(String, Flavor)],
    contexts: &ContextMap,
    checkouts: &CheckoutSet,
) -> Result<Vec<BuildTarget>, RepoError> {
    // One lookup per distinct group, shared across the contexts (flavors)
    // that reference it.
    let mut lookups: HashMap<String, TroveSpec> = HashMap::new();
    for (group, _) in pairs {
        if checkouts.contains(group) {
            continue;
        }
        lookups.entry(group.clone()).or_insert_with(|| {
            TroveSpec::new(source_name(group), Some(stage_label.to_string()), None)
        });
    }

    let specs: Vec<TroveSpec> = lookups.values().cloned().collect();
    let found = repo.find_troves(&specs, &[], true).await?;
    let on_repo: HashSet<&String> = lookups
        .iter()
        .filter(|(_, spec)| found.best(spec).is_some())
        .map(|(group, _)| group)
        .collect();

    let mut targets = Vec::new();
    for (group, flavor) in pairs {
        let Some(context) = contexts.context_for(flavor) else {
            tracing::debug!("no context derived for flavor '{flavor}', skipping {group}");
            continue;
        };
        if let Some(recipe) = checkouts.recipe(group) {
            targets.push(BuildTarget::Recipe {
                path: recipe.clone(),
                flavor: None,
                context: context.to_string(),
            });
        } else if on_repo.contains(group) {
            targets.push(BuildTarget::Repository {
                name: group.clone(),
                context: context.to_string(),
            });
        } else {
            // Neither edited nor on the repository: allow-missing drop.
            tracing::debug!("group {group} not found on {stage_label}, dropped");
        }
    }

    Ok(targets)
}
