//! Build and plan command implementation
//!
//! `forgeplan build` composes a job and submits it; `forgeplan plan` is
//! the same composition as a dry run. Both run one composition pass:
//! context derivation, group planning, edited-package overlay, job
//! merge.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::BuildScope;
use crate::cli::output::{self, status};
use crate::config::defaults;
use crate::core::checkout::CheckoutSet;
use crate::core::composer::{Composer, PlanReport};
use crate::core::global_config::GlobalConfig;
use crate::core::hooks::{self, HookRegistry, PlanRequest};
use crate::core::product::ProductDefinition;
use crate::orchestrator::client::HttpOrchestrator;
use crate::repo::client::HttpRepository;

/// Execute the build or plan command
pub async fn execute(project_dir: &Path, scope: BuildScope, submit: bool) -> Result<()> {
    let product_path = project_dir.join(defaults::PRODUCT_FILE);
    let product = ProductDefinition::load(&product_path)?;
    let checkouts =
        CheckoutSet::scan(project_dir).with_context(|| "Failed to scan checkouts")?;

    let global = GlobalConfig::load().with_context(|| "Failed to load global config")?;
    let repo = HttpRepository::new(global.repository_url());
    let orchestrator = HttpOrchestrator::new(global.orchestrator_url());
    orchestrator
        .check_api_version()
        .await
        .with_context(|| "Orchestrator is not compatible")?;

    tracing::info!("Composing job for product: {}", product.product.name);

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let hooks = HookRegistry::new();

    let (operation, report) = match scope {
        BuildScope::Groups { names } => {
            let request = hooks.apply_pre(
                hooks::PLAN_GROUPS,
                PlanRequest {
                    names: (!names.is_empty()).then_some(names),
                    ..PlanRequest::default()
                },
            );
            let report = match &request.names {
                Some(names) => composer.plan_groups(names).await?,
                None => composer.plan_all_groups().await?,
            };
            (hooks::PLAN_GROUPS, report)
        }
        BuildScope::Packages { names, recurse } => {
            let request = hooks.apply_pre(
                hooks::PLAN_PACKAGES,
                PlanRequest {
                    names: (!names.is_empty()).then_some(names),
                    recurse,
                },
            );
            let report = composer
                .plan_packages(request.names.as_deref(), request.recurse)
                .await?;
            (hooks::PLAN_PACKAGES, report)
        }
        BuildScope::All => {
            // Edited packages pull the group job in as their base; with
            // none edited the group job stands alone.
            let report = if checkouts.packages().is_empty() {
                composer.plan_all_groups().await?
            } else {
                composer.plan_all_packages().await?
            };
            (hooks::OVERLAY, report)
        }
    };

    let PlanReport { job, warnings } = report;
    let job = hooks.apply_post(operation, job);

    for warning in &warnings {
        output::println_unless_quiet(&format!("{} {warning}", status::WARNING));
    }

    if output::is_json() {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_summary(&job);
    }

    if submit {
        let job = hooks.apply_post(hooks::SUBMIT, job);
        let handle = composer.submit(&job).await?;
        output::println_unless_quiet(&format!(
            "{} Submitted job {}",
            status::SUCCESS,
            handle.job_id
        ));
    }

    Ok(())
}

fn print_summary(job: &crate::core::job::Job) {
    if output::is_quiet() {
        return;
    }
    println!("Job: {} troves, {} contexts", job.trove_list.len(), job.configs.len());
    for (context, config) in &job.configs {
        if config.build_specs.is_empty() {
            continue;
        }
        println!("  [{context}] flavor: {}", config.flavor);
        for spec in &config.build_specs {
            println!("    {spec}");
        }
    }
    if !job.primary_targets.is_empty() {
        println!("Primary targets:");
        for entry in &job.primary_targets {
            println!("  {entry}");
        }
    }
}
