//! Error types for forgeplan
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Product definition errors
#[derive(Error, Debug)]
pub enum ProductError {
    /// Product file not found
    #[error("No product definition found at '{path}'. Run forgeplan from a product checkout.")]
    NotFound { path: PathBuf },

    /// IO error reading the product file
    #[error("Failed to read product definition '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// TOML parse error
    #[error("Failed to parse product definition: {source}")]
    ParseError { source: toml::de::Error },

    /// Semantic validation failure
    #[error("Invalid product definition: {message}")]
    Validation { message: String },

    /// Active stage is not declared
    #[error("Active stage '{stage}' is not declared in the product definition")]
    UnknownStage { stage: String },
}

/// Checkout scanning errors
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Failed to walk the checkouts directory
    #[error("Failed to scan checkouts under '{path}': {error}")]
    Scan { path: PathBuf, error: String },
}

/// Repository collaborator errors
#[derive(Error, Debug)]
pub enum RepoError {
    /// Network failure talking to the repository
    #[error("Repository request to '{url}' failed: {error}")]
    Network { url: String, error: String },

    /// Request kept failing after retries
    #[error("Repository request failed after {retries} retries: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },

    /// Repository returned something the client cannot interpret
    #[error("Unexpected repository response: {message}")]
    Protocol { message: String },

    /// A required spec was not found and allow-missing was off
    #[error("Trove not found: {spec}")]
    NotFound { spec: String },
}

/// Build orchestrator collaborator errors
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Network failure talking to the orchestrator
    #[error("Orchestrator request to '{url}' failed: {error}")]
    Network { url: String, error: String },

    /// Orchestrator returned something the client cannot interpret
    #[error("Unexpected orchestrator response: {message}")]
    Protocol { message: String },

    /// Server API version is outside the supported range
    #[error("Orchestrator API version {server} does not satisfy '{supported}'. Update forgeplan or the orchestrator.")]
    ApiVersionMismatch { server: String, supported: String },

    /// No such job
    #[error("Job {job_id} not found on the orchestrator")]
    JobNotFound { job_id: u64 },
}

/// Planning and composition errors
#[derive(Error, Debug)]
pub enum PlanError {
    /// Explicitly named items are absent from the edited set
    #[error("The following {kind} were not found: {}", missing.join(", "))]
    UserInput {
        kind: &'static str,
        /// Sorted list of missing names
        missing: Vec<String>,
    },

    /// An implicit "build everything" request found nothing buildable
    #[error("Nothing to build")]
    NothingToBuild,

    /// The product carries no flavor/context information at all
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Repository round trip failed
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Orchestrator round trip failed
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

impl PlanError {
    /// Build a [`PlanError::UserInput`] with the missing names sorted
    pub fn user_input(kind: &'static str, mut missing: Vec<String>) -> Self {
        missing.sort();
        Self::UserInput { kind, missing }
    }
}

/// Hook registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Registration against an operation the registry does not define
    #[error("Unknown hook operation '{name}' (known: {})", known.join(", "))]
    UnknownOperation { name: String, known: Vec<String> },
}

/// Top-level forgeplan error type
#[derive(Error, Debug)]
pub enum ForgeplanError {
    /// Product definition error
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Checkout scan error
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Repository error
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    /// Orchestrator error
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    /// Planning error
    #[error("{0}")]
    Plan(#[from] PlanError),

    /// Hook error
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Generic error
    #[error("{0}")]
    Generic(String),
}
