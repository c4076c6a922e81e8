//! Build orchestrator collaborator
//!
//! The orchestrator turns a list of rendered build targets plus
//! per-context configuration into a concrete job (resolving targets to a
//! trove list), runs submitted jobs, and answers status queries. The
//! planner composes jobs; it never builds anything itself.

pub mod client;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::job::{BuildConfig, Job};
use crate::core::label::Label;
use crate::core::spec::JobEntry;
use crate::error::OrchestratorError;

/// How far `create_job` recurses into named targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurseMode {
    /// Build exactly the named targets
    #[default]
    None,
    /// Recurse into groups, building their binary members
    GroupsOnly,
    /// Recurse into groups and rebuild members from source
    GroupsAndSource,
}

/// Everything the orchestrator needs to compose one job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequest {
    /// Rendered build targets (`name{context}` / `path[flavor]{context}`)
    pub targets: Vec<String>,
    /// Rebuild even when a matching binary exists
    pub rebuild: bool,
    /// Target recursion mode
    pub recurse: RecurseMode,
    /// Restrict resolution to these labels (empty means no restriction)
    pub limit_to_labels: Vec<Label>,
    /// Per-context build configuration
    pub configs: BTreeMap<String, BuildConfig>,
}

/// Handle to a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: u64,
}

/// Lifecycle state of a job on the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Building,
    Built,
    Failed,
}

/// Snapshot of a job the orchestrator knows about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: u64,
    pub state: JobState,
    /// The job's trove list, contexts included
    #[serde(default)]
    pub troves: Vec<JobEntry>,
}

impl JobStatus {
    /// Whether every trove in the job has been built
    pub fn is_built(&self) -> bool {
        self.state == JobState::Built
    }

    /// Whether the job has reached a terminal state
    pub fn is_finished(&self) -> bool {
        matches!(self.state, JobState::Built | JobState::Failed)
    }
}

/// Job composition and introspection contract the planner requires
pub trait Orchestrator {
    /// Compose a job from rendered targets; nothing is scheduled yet
    fn create_job(
        &self,
        request: &JobRequest,
    ) -> impl std::future::Future<Output = Result<Job, OrchestratorError>> + Send;

    /// Submit a composed job for building
    fn submit(
        &self,
        job: &Job,
    ) -> impl std::future::Future<Output = Result<JobHandle, OrchestratorError>> + Send;

    /// Status of a previously submitted job
    fn job_status(
        &self,
        job_id: u64,
    ) -> impl std::future::Future<Output = Result<JobStatus, OrchestratorError>> + Send;
}
