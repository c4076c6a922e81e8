//! Common test utilities and helpers
//!
//! Shared fixtures for integration tests: a temporary project directory
//! with a product definition and checkouts, plus in-memory fakes for the
//! repository and orchestrator collaborators.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::TempDir;

use forgeplan::core::label::Label;
use forgeplan::core::spec::{TroveSpec, TroveTup};
use forgeplan::core::version::Version;
use forgeplan::error::{OrchestratorError, RepoError};
use forgeplan::orchestrator::{
    JobHandle, JobRequest, JobState, JobStatus, Orchestrator,
};
use forgeplan::repo::{FindResult, Repository};

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up product definitions and checkouts.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Write the sample product definition
    pub fn with_product(self) -> Self {
        self.create_file("product.toml", SAMPLE_PRODUCT);
        self
    }

    /// Create a checkout of `name` under `checkouts/` and return the
    /// recipe path
    pub fn checkout(&self, name: &str) -> PathBuf {
        let recipe = format!("checkouts/{name}/{name}.recipe");
        self.create_file(&recipe, &format!("# {name} recipe\n"));
        self.dir.path().join(recipe)
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample product definition TOML for testing
///
/// Two stages, a two-entry search path, and two build definitions for
/// the same image group on different architectures.
pub const SAMPLE_PRODUCT: &str = r#"
[product]
name = "appliance"
active_stage = "devel"
base_flavor = "ssl"

[[stages]]
name = "devel"
label = "products.example.com@ex:devel"

[[stages]]
name = "qa"
label = "products.example.com@ex:qa"

[[search_path]]
group = "group-os"
label = "upstream.example.com@ex:2"

[[search_path]]
label = "upstream.example.com@ex:contrib"

[[builds]]
name = "server x86"
image_group = "group-server-dist"
source_group = "group-server"
flavor = "is: x86"

[[builds]]
name = "server x86_64"
image_group = "group-server-dist"
source_group = "group-server"
flavor = "is: x86_64"
"#;

/// Build a label, panicking on bad input
pub fn label(s: &str) -> Label {
    Label::parse(s).expect("invalid test label")
}

/// Build a trove tuple on the devel stage label
pub fn tup(name: &str, serial: u64) -> TroveTup {
    TroveTup::new(
        name,
        Version::new(
            label("products.example.com@ex:devel"),
            format!("1.0-{serial}"),
            serial,
        ),
        forgeplan::core::flavor::Flavor::empty(),
    )
}

/// In-memory repository fake
///
/// Lookup tables keyed by spec name; `find_troves` matches specs by name
/// only, which is all the planning tests need.
#[derive(Default)]
pub struct FakeRepository {
    /// Matches per spec name
    pub troves: HashMap<String, Vec<TroveTup>>,
    /// Deep contents per trove name
    pub contents: HashMap<String, Vec<TroveTup>>,
    /// Every spec list passed to `find_troves`, in call order
    pub find_calls: Mutex<Vec<Vec<TroveSpec>>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register matches for a spec name
    pub fn with_trove(mut self, name: &str, matches: Vec<TroveTup>) -> Self {
        self.troves.insert(name.to_string(), matches);
        self
    }

    /// Register deep contents for a trove name
    pub fn with_contents(mut self, name: &str, contents: Vec<TroveTup>) -> Self {
        self.contents.insert(name.to_string(), contents);
        self
    }

    /// Number of `find_troves` round trips so far
    pub fn find_call_count(&self) -> usize {
        self.find_calls.lock().unwrap().len()
    }
}

impl Repository for FakeRepository {
    async fn find_troves(
        &self,
        specs: &[TroveSpec],
        _search_labels: &[Label],
        allow_missing: bool,
    ) -> Result<FindResult, RepoError> {
        self.find_calls.lock().unwrap().push(specs.to_vec());

        let mut result = FindResult::default();
        for spec in specs {
            match self.troves.get(&spec.name) {
                Some(matches) => {
                    result.found.insert(spec.clone(), matches.clone());
                }
                None if allow_missing => {
                    result.missing.insert(spec.clone());
                }
                None => {
                    return Err(RepoError::NotFound {
                        spec: spec.to_string(),
                    });
                }
            }
        }
        Ok(result)
    }

    async fn trove_contents(&self, trove: &TroveTup) -> Result<Vec<TroveTup>, RepoError> {
        Ok(self.contents.get(&trove.name).cloned().unwrap_or_default())
    }
}

/// In-memory orchestrator fake
///
/// `create_job` resolves each requested target to one job entry; the
/// resolution table maps rendered target strings to entries.
#[derive(Default)]
pub struct FakeOrchestrator {
    /// Resolved entries per rendered target string
    pub resolutions: HashMap<String, Vec<forgeplan::core::spec::JobEntry>>,
    /// Jobs handed to `submit`
    pub submitted: Mutex<Vec<forgeplan::core::job::Job>>,
    /// Status per job id
    pub statuses: BTreeMap<u64, JobState>,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the entries a rendered target resolves to
    pub fn resolving(mut self, target: &str, entries: Vec<forgeplan::core::spec::JobEntry>) -> Self {
        self.resolutions.insert(target.to_string(), entries);
        self
    }

    pub fn with_status(mut self, job_id: u64, state: JobState) -> Self {
        self.statuses.insert(job_id, state);
        self
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

impl Orchestrator for FakeOrchestrator {
    async fn create_job(
        &self,
        request: &JobRequest,
    ) -> Result<forgeplan::core::job::Job, OrchestratorError> {
        let mut job = forgeplan::core::job::Job::new();
        for target in &request.targets {
            let Some(entries) = self.resolutions.get(target) else {
                return Err(OrchestratorError::Protocol {
                    message: format!("unexpected target '{target}'"),
                });
            };
            for entry in entries {
                job.add_entry(entry.clone());
            }
        }
        Ok(job)
    }

    async fn submit(
        &self,
        job: &forgeplan::core::job::Job,
    ) -> Result<JobHandle, OrchestratorError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(job.clone());
        Ok(JobHandle {
            job_id: submitted.len() as u64,
        })
    }

    async fn job_status(&self, job_id: u64) -> Result<JobStatus, OrchestratorError> {
        let state = self
            .statuses
            .get(&job_id)
            .copied()
            .ok_or(OrchestratorError::JobNotFound { job_id })?;
        Ok(JobStatus {
            job_id,
            state,
            troves: Vec::new(),
        })
    }
}
