//! Priority-ordered package lookup across search paths
//!
//! Resolves a package name against an ordered list of search-path
//! entries. Direct-label entries query the repository for the package
//! itself; inside-group entries resolve the group first (batched,
//! allow-missing) and look for the package among the group's transitive
//! contents. Result order follows search-path order: the first entry's
//! matches come first, so callers can treat the list as candidates in
//! priority order.
//!
//! A group that cannot be resolved is skipped silently; a name found in
//! no entry resolves to an empty list, never an error.

use std::collections::HashMap;

use crate::core::searchpath::SearchPathEntry;
use crate::core::spec::{TroveSpec, TroveTup};
use crate::error::RepoError;
use crate::repo::Repository;

/// Resolve `package` across `search_path`, highest priority first
pub async fn resolve<R: Repository>(
    repo: &R,
    search_path: &[SearchPathEntry],
    package: &str,
) -> Result<Vec<TroveTup>, RepoError> {
    // Several entries may reference the same group trove; resolve each
    // distinct spec once and attribute matches back to every entry index.
    let mut group_indices: HashMap<TroveSpec, Vec<usize>> = HashMap::new();
    let mut direct_indices: HashMap<TroveSpec, Vec<usize>> = HashMap::new();
    for (index, entry) in search_path.iter().enumerate() {
        match entry.group_spec() {
            Some(spec) => group_indices.entry(spec).or_default().push(index),
            None => direct_indices
                .entry(entry.package_spec(package))
                .or_default()
                .push(index),
        }
    }

    let group_specs: Vec<TroveSpec> = group_indices.keys().cloned().collect();
    let groups = repo.find_troves(&group_specs, &[], true).await?;

    // Deep contents per resolved group, fetched once even when several
    // specs resolve to the same trove.
    let mut selected: HashMap<TroveSpec, TroveTup> = HashMap::new();
    let mut contents: HashMap<TroveTup, Vec<TroveTup>> = HashMap::new();
    for spec in &group_specs {
        let Some(best) = groups.best(spec) else {
            tracing::debug!("search path group {spec} not found, skipping");
            continue;
        };
        if !contents.contains_key(best) {
            let members = repo.trove_contents(best).await?;
            contents.insert(best.clone(), members);
        }
        selected.insert(spec.clone(), best.clone());
    }

    let direct_specs: Vec<TroveSpec> = direct_indices.keys().cloned().collect();
    let direct = repo.find_troves(&direct_specs, &[], true).await?;

    // Reassemble in search-path order.
    let mut per_index: Vec<Vec<TroveTup>> = vec![Vec::new(); search_path.len()];
    for (spec, indices) in &group_indices {
        let Some(group) = selected.get(spec) else {
            continue;
        };
        let matches: Vec<TroveTup> = contents[group]
            .iter()
            .filter(|member| member.name == package)
            .cloned()
            .collect();
        for &index in indices {
            per_index[index].extend(matches.iter().cloned());
        }
    }
    for (spec, indices) in &direct_indices {
        let matches = direct.matches(spec);
        for &index in indices {
            per_index[index].extend(matches.iter().cloned());
        }
    }

    Ok(per_index.into_iter().flatten().collect())
}
