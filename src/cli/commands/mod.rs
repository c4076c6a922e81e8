//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod resolve;
pub mod status;

use anyhow::Result;
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose a build job and submit it to the orchestrator
    Build {
        #[command(subcommand)]
        scope: BuildScope,
    },

    /// Compose a build job and print it without submitting (dry run)
    Plan {
        #[command(subcommand)]
        scope: BuildScope,
    },

    /// Resolve a package across the product search path
    Resolve {
        /// Package name to look up
        package: String,
    },

    /// Show the status of a submitted job
    Status {
        /// Job id returned at submission
        job_id: u64,

        /// Poll until the job reaches a terminal state
        #[arg(long)]
        watch: bool,
    },
}

/// What a build or plan invocation targets
#[derive(Subcommand, Debug)]
pub enum BuildScope {
    /// Build the product's groups (all of them when no names are given)
    Groups {
        /// Specific groups to build
        names: Vec<String>,
    },

    /// Build edited packages, overlaid on the group job
    Packages {
        /// Specific packages to build (default: everything edited)
        names: Vec<String>,

        /// Recurse into groups and rebuild members from source
        #[arg(long)]
        recurse: bool,
    },

    /// Build groups and edited packages together
    All,
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        let project_dir = std::env::current_dir()?;
        match self {
            Self::Build { scope } => build::execute(&project_dir, scope, true).await,
            Self::Plan { scope } => build::execute(&project_dir, scope, false).await,
            Self::Resolve { package } => resolve::execute(&project_dir, &package).await,
            Self::Status { job_id, watch } => status::execute(job_id, watch).await,
        }
    }
}
