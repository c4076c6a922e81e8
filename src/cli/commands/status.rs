//! Status command implementation
//!
//! Shows the state of a submitted job; `--watch` polls until the job
//! reaches a terminal state.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::output::{self, create_spinner, status};
use crate::config::defaults;
use crate::core::global_config::GlobalConfig;
use crate::orchestrator::client::HttpOrchestrator;
use crate::orchestrator::{JobStatus, Orchestrator};

/// Execute the status command
pub async fn execute(job_id: u64, watch: bool) -> Result<()> {
    let global = GlobalConfig::load().with_context(|| "Failed to load global config")?;
    let orchestrator = HttpOrchestrator::new(global.orchestrator_url());

    let status = if watch {
        watch_job(&orchestrator, job_id).await?
    } else {
        orchestrator.job_status(job_id).await?
    };

    if output::is_json() {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let glyph = if status.is_built() {
        status::SUCCESS
    } else if status.is_finished() {
        status::ERROR
    } else {
        status::INFO
    };
    println!("{glyph} Job {} is {:?}", status.job_id, status.state);
    for trove in &status.troves {
        println!("  {trove}");
    }
    Ok(())
}

async fn watch_job(orchestrator: &HttpOrchestrator, job_id: u64) -> Result<JobStatus> {
    let spinner = create_spinner(&format!("Watching job {job_id}"));
    loop {
        let status = orchestrator.job_status(job_id).await?;
        if status.is_finished() {
            spinner.finish_and_clear();
            return Ok(status);
        }
        spinner.set_message(format!("Job {job_id}: {:?}", status.state));
        tokio::time::sleep(Duration::from_secs(defaults::WATCH_POLL_SECS)).await;
    }
}
