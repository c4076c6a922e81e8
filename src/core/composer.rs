//! Composition facade
//!
//! One [`Composer`] per composition request: it derives the flavor →
//! context map and the per-context build configurations exactly once,
//! then drives group planning, edited-package overlay, and job merging
//! against the repository and orchestrator collaborators. Composition is
//! atomic-or-discard: on error, partially assembled jobs are thrown away
//! by the caller, never reused.

use std::collections::BTreeMap;

use crate::core::checkout::CheckoutSet;
use crate::core::context::ContextMap;
use crate::core::flavor::Flavor;
use crate::core::groups;
use crate::core::job::{overlay, BuildConfig, Job};
use crate::core::packages;
use crate::core::product::ProductDefinition;
use crate::core::resolver;
use crate::core::spec::{BuildTarget, TroveTup};
use crate::error::PlanError;
use crate::orchestrator::{JobHandle, JobRequest, Orchestrator, RecurseMode};
use crate::repo::Repository;

/// A composed job plus anything the caller should surface to the user
#[derive(Debug)]
pub struct PlanReport {
    pub job: Job,
    /// Degraded-fallback warnings, already logged, for display
    pub warnings: Vec<String>,
}

/// Drives one composition pass
pub struct Composer<'a, R, O> {
    repo: &'a R,
    orchestrator: &'a O,
    product: &'a ProductDefinition,
    checkouts: &'a CheckoutSet,
    contexts: ContextMap,
    configs: BTreeMap<String, BuildConfig>,
}

impl<'a, R: Repository, O: Orchestrator> Composer<'a, R, O> {
    /// Set up a composition pass over one product checkout
    ///
    /// The context map and per-context configurations are derived here and
    /// never recomputed: a flavor maps to the same context for the whole
    /// pass.
    pub fn new(
        repo: &'a R,
        orchestrator: &'a O,
        product: &'a ProductDefinition,
        checkouts: &'a CheckoutSet,
    ) -> Self {
        let contexts = ContextMap::new(product.flavors());
        let mut configs = BTreeMap::new();
        for (flavor, context) in contexts.iter() {
            configs.insert(
                context.to_string(),
                BuildConfig {
                    context: context.to_string(),
                    flavor: flavor.clone(),
                    build_flavor: flavor.clone(),
                    build_specs: Vec::new(),
                    resolve_troves: product
                        .search_path
                        .iter()
                        .filter_map(|entry| entry.group_spec())
                        .map(|spec| vec![spec])
                        .collect(),
                    install_label_path: product.install_label_path(),
                    macros: product.macros.clone(),
                },
            );
        }
        Self {
            repo,
            orchestrator,
            product,
            checkouts,
            contexts,
            configs,
        }
    }

    /// The flavor → context map of this pass
    pub fn contexts(&self) -> &ContextMap {
        &self.contexts
    }

    /// Plan and compose group builds; `None` means nothing to build
    pub async fn maybe_plan_groups(
        &self,
        names: Option<&[String]>,
    ) -> Result<Option<PlanReport>, PlanError> {
        let pairs = self.group_pairs(names)?;
        let targets = groups::plan(
            self.repo,
            &self.product.active_stage().label,
            &pairs,
            &self.contexts,
            self.checkouts,
        )
        .await?;
        if targets.is_empty() {
            return Ok(None);
        }

        let job = self
            .compose(&targets, false, RecurseMode::GroupsOnly)
            .await?;
        Ok(Some(PlanReport {
            job,
            warnings: Vec::new(),
        }))
    }

    /// Compose the job for explicitly named groups
    pub async fn plan_groups(&self, names: &[String]) -> Result<PlanReport, PlanError> {
        self.maybe_plan_groups(Some(names))
            .await?
            .ok_or(PlanError::NothingToBuild)
    }

    /// Compose the job for every group the product declares or has edited
    pub async fn plan_all_groups(&self) -> Result<PlanReport, PlanError> {
        self.maybe_plan_groups(None)
            .await?
            .ok_or(PlanError::NothingToBuild)
    }

    /// Compose the overlaid job for edited packages
    ///
    /// Plans the main group job, replaces edited packages inside it, and
    /// overlays the replacement job on top. `names == None` means "every
    /// edited package"; explicit names must all be edited.
    pub async fn plan_packages(
        &self,
        names: Option<&[String]>,
        recurse: bool,
    ) -> Result<PlanReport, PlanError> {
        let all_edited = self.checkouts.packages();
        let edited: BTreeMap<_, _> = match names {
            Some(names) => {
                let missing: Vec<String> = names
                    .iter()
                    .filter(|name| !all_edited.contains_key(*name))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(PlanError::user_input("packages", missing));
                }
                all_edited
                    .into_iter()
                    .filter(|(name, _)| names.contains(name))
                    .collect()
            }
            None => {
                if all_edited.is_empty() {
                    return Err(PlanError::NothingToBuild);
                }
                all_edited
            }
        };

        let main = self
            .maybe_plan_groups(None)
            .await?
            .map(|report| report.job);

        // Overlay planning mutates the main job in place; with no group
        // job the edits are planned against an empty one.
        let mut main_job = main.unwrap_or_default();
        let had_main = !main_job.trove_list.is_empty() || !main_job.configs.is_empty();
        let outcome = packages::overlay_edited(&mut main_job, &edited, &self.contexts)?;

        let recurse_mode = if recurse {
            RecurseMode::GroupsAndSource
        } else {
            RecurseMode::None
        };
        let replacement = self.compose(&outcome.targets, true, recurse_mode).await?;

        let job = overlay(had_main.then_some(main_job), replacement);
        let warnings = outcome
            .fallback
            .iter()
            .map(|name| {
                format!("{name} is not in any built group; built for every known context")
            })
            .collect();
        Ok(PlanReport { job, warnings })
    }

    /// Compose the overlaid job for every edited package
    pub async fn plan_all_packages(&self) -> Result<PlanReport, PlanError> {
        self.plan_packages(None, false).await
    }

    /// Resolve a package across the product search path, priority order
    pub async fn resolve_package(&self, package: &str) -> Result<Vec<TroveTup>, PlanError> {
        Ok(resolver::resolve(self.repo, &self.product.search_path, package).await?)
    }

    /// Submit a composed job for building
    pub async fn submit(&self, job: &Job) -> Result<JobHandle, PlanError> {
        Ok(self.orchestrator.submit(job).await?)
    }

    /// The (group, flavor) pairs to plan, honoring an explicit name list
    ///
    /// Product build definitions come first; edited groups the product
    /// does not declare are planned once per known flavor.
    fn group_pairs(&self, names: Option<&[String]>) -> Result<Vec<(String, Flavor)>, PlanError> {
        let mut pairs = self.product.group_pairs(&self.product.active_stage().name);
        for (group, _) in self.checkouts.groups() {
            if !pairs.iter().any(|(name, _)| *name == group) {
                for (flavor, _) in self.contexts.iter() {
                    pairs.push((group.clone(), flavor.clone()));
                }
            }
        }

        if let Some(names) = names {
            let missing: Vec<String> = names
                .iter()
                .filter(|name| !pairs.iter().any(|(group, _)| group == *name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(PlanError::user_input("groups", missing));
            }
            pairs.retain(|(group, _)| names.contains(group));
        }

        Ok(pairs)
    }

    /// Hand a target list to the orchestrator and normalize the result
    ///
    /// The client-side per-context configuration is authoritative; the
    /// orchestrator contributes the resolved trove list.
    async fn compose(
        &self,
        targets: &[BuildTarget],
        rebuild: bool,
        recurse: RecurseMode,
    ) -> Result<Job, PlanError> {
        let mut configs = self.configs.clone();
        for target in targets {
            if let Some(config) = configs.get_mut(target.context()) {
                config.build_specs.push(target.to_string());
            } else {
                tracing::debug!("target {target} has no configured context, skipped");
            }
        }

        let request = JobRequest {
            targets: targets.iter().map(ToString::to_string).collect(),
            rebuild,
            recurse,
            limit_to_labels: vec![self.product.active_stage().label.clone()],
            configs: configs.clone(),
        };

        let mut job = self.orchestrator.create_job(&request).await?;
        job.configs = configs;
        job.primary_targets = job.trove_list.clone();
        Ok(job)
    }
}
