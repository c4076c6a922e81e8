//! Integration tests for the composition facade
//!
//! End-to-end composition against in-memory collaborators:
//! - Group planning builds one target per (group, context)
//! - Edited groups build from the local recipe instead of the repository
//! - Edited packages replace their group-job entries and overlay on top
//! - Unknown explicit names fail before any job is composed

mod common;

use std::path::Path;

use common::{label, tup, FakeOrchestrator, FakeRepository, TestProject};
use forgeplan::core::checkout::CheckoutSet;
use forgeplan::core::composer::Composer;
use forgeplan::core::flavor::Flavor;
use forgeplan::core::product::ProductDefinition;
use forgeplan::core::spec::JobEntry;
use forgeplan::core::version::Version;
use forgeplan::error::PlanError;

fn load_product(project: &TestProject) -> ProductDefinition {
    ProductDefinition::load(&project.path().join("product.toml")).expect("product should parse")
}

fn scan(project: &TestProject) -> CheckoutSet {
    CheckoutSet::scan(&project.path()).expect("checkout scan should succeed")
}

/// A job entry with the given flavor and context on the devel label
fn entry(name: &str, serial: u64, flavor: &str, context: &str) -> JobEntry {
    JobEntry {
        name: name.to_string(),
        version: Version::new(
            label("products.example.com@ex:devel"),
            format!("1.0-{serial}"),
            serial,
        ),
        flavor: Flavor::parse(flavor).expect("valid test flavor"),
        context: context.to_string(),
    }
}

/// Orchestrator that resolves the sample product's two group targets
fn group_orchestrator() -> FakeOrchestrator {
    FakeOrchestrator::new()
        .resolving(
            "group-server{x86}",
            vec![
                entry("group-server", 7, "ssl is: x86", "x86"),
                entry("httpd:runtime", 5, "ssl is: x86", "x86"),
            ],
        )
        .resolving(
            "group-server{x86_64}",
            vec![
                entry("group-server", 7, "ssl is: x86_64", "x86_64"),
                entry("httpd:runtime", 5, "ssl is: x86_64", "x86_64"),
            ],
        )
}

#[tokio::test]
async fn test_plan_all_groups_builds_each_context() {
    let project = TestProject::new().with_product();
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new().with_trove("group-server:source", vec![tup("group-server:source", 4)]);
    let orchestrator = group_orchestrator();

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let report = composer.plan_all_groups().await.expect("plan should succeed");

    assert_eq!(report.job.trove_list.len(), 4);
    assert!(report.warnings.is_empty());

    // Both contexts carry the group target in their build specs.
    let x86 = report.job.config("x86").expect("x86 config");
    assert_eq!(x86.build_specs, vec!["group-server{x86}".to_string()]);
    let x86_64 = report.job.config("x86_64").expect("x86_64 config");
    assert_eq!(x86_64.build_specs, vec!["group-server{x86_64}".to_string()]);

    // The search path's group entry feeds dependency resolution.
    assert_eq!(x86.resolve_troves.len(), 1);
    assert_eq!(x86.resolve_troves[0][0].name, "group-os");

    // One batched repository round trip for all groups.
    assert_eq!(repo.find_call_count(), 1);
}

#[tokio::test]
async fn test_edited_group_builds_from_local_recipe() {
    let project = TestProject::new().with_product();
    let recipe = project.checkout("group-server");
    let product = load_product(&project);
    let checkouts = scan(&project);

    // The repository does not know the group; the checkout must win
    // regardless.
    let repo = FakeRepository::new();
    let target_x86 = format!("{}{{x86}}", recipe.display());
    let target_x86_64 = format!("{}{{x86_64}}", recipe.display());
    let orchestrator = FakeOrchestrator::new()
        .resolving(&target_x86, vec![entry("group-server", 8, "ssl is: x86", "x86")])
        .resolving(
            &target_x86_64,
            vec![entry("group-server", 8, "ssl is: x86_64", "x86_64")],
        );

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let report = composer.plan_all_groups().await.expect("plan should succeed");

    assert_eq!(report.job.trove_list.len(), 2);
    let x86 = report.job.config("x86").expect("x86 config");
    assert_eq!(x86.build_specs, vec![target_x86]);
}

#[tokio::test]
async fn test_unknown_group_name_fails_with_missing_list() {
    let project = TestProject::new().with_product();
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new();
    let orchestrator = FakeOrchestrator::new();
    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);

    let err = composer
        .plan_groups(&["group-nope".to_string()])
        .await
        .expect_err("unknown group must fail");
    match err {
        PlanError::UserInput { kind, missing } => {
            assert_eq!(kind, "groups");
            assert_eq!(missing, vec!["group-nope".to_string()]);
        }
        other => panic!("expected UserInput, got {other:?}"),
    }

    // Failing input validation composes nothing.
    assert_eq!(repo.find_call_count(), 0);
}

#[tokio::test]
async fn test_dropped_groups_mean_nothing_to_build() {
    let project = TestProject::new().with_product();
    let product = load_product(&project);
    let checkouts = scan(&project);

    // No checkout and no repository hit: the only group is dropped.
    let repo = FakeRepository::new();
    let orchestrator = FakeOrchestrator::new();
    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);

    let err = composer.plan_all_groups().await.expect_err("must fail");
    assert!(matches!(err, PlanError::NothingToBuild));
}

#[tokio::test]
async fn test_edited_package_replaces_group_entries() {
    let project = TestProject::new().with_product();
    let recipe = project.checkout("httpd");
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new().with_trove("group-server:source", vec![tup("group-server:source", 4)]);

    let replacement_x86 = format!("{}[ssl is: x86]{{x86}}", recipe.display());
    let replacement_x86_64 = format!("{}[ssl is: x86_64]{{x86_64}}", recipe.display());
    let orchestrator = group_orchestrator()
        .resolving(&replacement_x86, vec![entry("httpd", 9, "ssl is: x86", "x86")])
        .resolving(
            &replacement_x86_64,
            vec![entry("httpd", 9, "ssl is: x86_64", "x86_64")],
        );

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let report = composer
        .plan_packages(None, false)
        .await
        .expect("plan should succeed");

    // Group entries are stripped; the httpd component entries are
    // replaced by the local builds.
    let names: Vec<&str> = report
        .job
        .trove_list
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["httpd", "httpd"]);
    assert!(report.warnings.is_empty());

    // The replacement preserved each superseded entry's context.
    let contexts: Vec<&str> = report
        .job
        .trove_list
        .iter()
        .map(|e| e.context.as_str())
        .collect();
    assert_eq!(contexts, vec!["x86", "x86_64"]);

    // The overlay appends the replacement specs after the group job's.
    let x86 = report.job.config("x86").expect("x86 config");
    assert_eq!(
        x86.build_specs,
        vec!["group-server{x86}".to_string(), replacement_x86]
    );

    // Overlaying makes the replacement entries the primary targets.
    assert_eq!(report.job.primary_targets.len(), 2);
}

#[tokio::test]
async fn test_edited_package_outside_groups_falls_back_per_context() {
    let project = TestProject::new().with_product();
    let recipe = project.checkout("sidecar");
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new().with_trove("group-server:source", vec![tup("group-server:source", 4)]);

    // No flavor could be inferred, so the fallback targets are unpinned.
    let fallback_x86 = format!("{}{{x86}}", recipe.display());
    let fallback_x86_64 = format!("{}{{x86_64}}", recipe.display());
    let orchestrator = group_orchestrator()
        .resolving(&fallback_x86, vec![entry("sidecar", 2, "", "x86")])
        .resolving(&fallback_x86_64, vec![entry("sidecar", 2, "", "x86_64")]);

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let report = composer
        .plan_packages(None, false)
        .await
        .expect("plan should succeed");

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("sidecar"));

    // The group job survives underneath the fallback builds.
    let names: Vec<&str> = report
        .job
        .trove_list
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert!(names.contains(&"httpd:runtime"));
    assert_eq!(names.iter().filter(|n| **n == "sidecar").count(), 2);
}

#[tokio::test]
async fn test_unedited_package_name_is_user_error() {
    let project = TestProject::new().with_product();
    project.checkout("httpd");
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new();
    let orchestrator = FakeOrchestrator::new();
    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);

    let err = composer
        .plan_packages(Some(&["httpd".to_string(), "ghost".to_string()]), false)
        .await
        .expect_err("unedited name must fail");
    match err {
        PlanError::UserInput { kind, missing } => {
            assert_eq!(kind, "packages");
            assert_eq!(missing, vec!["ghost".to_string()]);
        }
        other => panic!("expected UserInput, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_edited_packages_is_nothing_to_build() {
    let project = TestProject::new().with_product();
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new();
    let orchestrator = FakeOrchestrator::new();
    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);

    let err = composer
        .plan_packages(None, false)
        .await
        .expect_err("empty edit set must fail");
    assert!(matches!(err, PlanError::NothingToBuild));
}

#[tokio::test]
async fn test_submit_hands_job_to_orchestrator() {
    let project = TestProject::new().with_product();
    let product = load_product(&project);
    let checkouts = scan(&project);

    let repo = FakeRepository::new().with_trove("group-server:source", vec![tup("group-server:source", 4)]);
    let orchestrator = group_orchestrator();

    let composer = Composer::new(&repo, &orchestrator, &product, &checkouts);
    let report = composer.plan_all_groups().await.expect("plan should succeed");
    let handle = composer.submit(&report.job).await.expect("submit");

    assert_eq!(handle.job_id, 1);
    assert_eq!(orchestrator.submitted_count(), 1);
}

#[test]
fn test_checkout_scan_finds_recipes() {
    let project = TestProject::new().with_product();
    let recipe = project.checkout("httpd");
    project.checkout("group-server");
    // A directory without a matching recipe file is not a checkout.
    project.create_file("checkouts/scratch/notes.txt", "notes\n");

    let checkouts = CheckoutSet::scan(&project.path()).expect("scan");
    assert!(checkouts.contains("httpd"));
    assert!(checkouts.contains("group-server"));
    assert!(!checkouts.contains("scratch"));
    assert_eq!(checkouts.recipe("httpd"), Some(&recipe));
    assert_eq!(checkouts.groups().len(), 1);
    assert_eq!(checkouts.packages().len(), 1);
}

#[test]
fn test_checkout_scan_without_directory_is_empty() {
    let dir = Path::new("/nonexistent/forgeplan-test");
    let checkouts = CheckoutSet::scan(dir).expect("scan of missing dir");
    assert!(checkouts.is_empty());
}
