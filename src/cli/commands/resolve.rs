//! Resolve command implementation
//!
//! Resolves a single package name against the product's search path and
//! prints the matching troves in priority order.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{self, status};
use crate::config::defaults;
use crate::core::global_config::GlobalConfig;
use crate::core::product::ProductDefinition;
use crate::core::resolver;
use crate::repo::client::HttpRepository;

/// Execute the resolve command
pub async fn execute(project_dir: &Path, package: &str) -> Result<()> {
    let product_path = project_dir.join(defaults::PRODUCT_FILE);
    let product = ProductDefinition::load(&product_path)?;

    let global = GlobalConfig::load().with_context(|| "Failed to load global config")?;
    let repo = HttpRepository::new(global.repository_url());

    let spinner = output::create_spinner(&format!("Resolving {package}"));
    let matches = resolver::resolve(&repo, &product.search_path, package)
        .await
        .with_context(|| format!("Failed to resolve '{package}'"))?;
    spinner.finish_and_clear();

    if output::is_json() {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{} {package} not found on the search path", status::ERROR);
        return Ok(());
    }

    println!("{} {package} resolves to:", status::SUCCESS);
    for tup in &matches {
        println!("  {tup}");
    }
    Ok(())
}
