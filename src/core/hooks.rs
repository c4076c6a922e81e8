//! Hook registry for composition operations
//!
//! Callers can wrap the exposed composition operations with ordered pre-
//! and post-hooks: pre-hooks may rewrite the request, post-hooks may
//! rewrite the produced job. The operation-name set is fixed; registering
//! against an unknown name fails at registration time, not at dispatch.

use std::collections::BTreeMap;

use crate::core::job::Job;
use crate::error::HookError;

/// Operation names hooks can attach to
pub const PLAN_GROUPS: &str = "plan-groups";
pub const PLAN_PACKAGES: &str = "plan-packages";
pub const OVERLAY: &str = "overlay";
pub const SUBMIT: &str = "submit";

/// All dispatchable operation names
pub const OPERATIONS: [&str; 4] = [PLAN_GROUPS, PLAN_PACKAGES, OVERLAY, SUBMIT];

/// Inputs of one planning invocation, as hooks see them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRequest {
    /// Explicit names to build; `None` means "everything edited"
    pub names: Option<Vec<String>>,
    /// Recurse into groups and rebuild members from source
    pub recurse: bool,
}

type PreHook = Box<dyn Fn(PlanRequest) -> PlanRequest + Send + Sync>;
type PostHook = Box<dyn Fn(Job) -> Job + Send + Sync>;

/// Ordered pre/post hook lists per operation
#[derive(Default)]
pub struct HookRegistry {
    pre: BTreeMap<String, Vec<PreHook>>,
    post: BTreeMap<String, Vec<PostHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_operation(name: &str) -> Result<(), HookError> {
        if OPERATIONS.contains(&name) {
            Ok(())
        } else {
            Err(HookError::UnknownOperation {
                name: name.to_string(),
                known: OPERATIONS.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Attach a pre-hook to an operation
    pub fn register_pre<F>(&mut self, operation: &str, hook: F) -> Result<(), HookError>
    where
        F: Fn(PlanRequest) -> PlanRequest + Send + Sync + 'static,
    {
        Self::check_operation(operation)?;
        self.pre
            .entry(operation.to_string())
            .or_default()
            .push(Box::new(hook));
        Ok(())
    }

    /// Attach a post-hook to an operation
    pub fn register_post<F>(&mut self, operation: &str, hook: F) -> Result<(), HookError>
    where
        F: Fn(Job) -> Job + Send + Sync + 'static,
    {
        Self::check_operation(operation)?;
        self.post
            .entry(operation.to_string())
            .or_default()
            .push(Box::new(hook));
        Ok(())
    }

    /// Run an operation's pre-hooks over a request, in registration order
    pub fn apply_pre(&self, operation: &str, request: PlanRequest) -> PlanRequest {
        match self.pre.get(operation) {
            Some(hooks) => hooks.iter().fold(request, |req, hook| hook(req)),
            None => request,
        }
    }

    /// Run an operation's post-hooks over a job, in registration order
    pub fn apply_post(&self, operation: &str, job: Job) -> Job {
        match self.post.get(operation) {
            Some(hooks) => hooks.iter().fold(job, |job, hook| hook(job)),
            None => job,
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("pre", &self.pre.keys().collect::<Vec<_>>())
            .field("post", &self.post.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operation_rejected_at_registration() {
        let mut registry = HookRegistry::new();
        let err = registry
            .register_pre("plan-everything", |req| req)
            .unwrap_err();
        assert!(matches!(err, HookError::UnknownOperation { .. }));
    }

    #[test]
    fn test_pre_hooks_rewrite_request_in_order() {
        let mut registry = HookRegistry::new();
        registry
            .register_pre(PLAN_PACKAGES, |mut req| {
                req.names = Some(vec!["foo".to_string()]);
                req
            })
            .unwrap();
        registry
            .register_pre(PLAN_PACKAGES, |mut req| {
                if let Some(names) = &mut req.names {
                    names.push("bar".to_string());
                }
                req
            })
            .unwrap();

        let out = registry.apply_pre(PLAN_PACKAGES, PlanRequest::default());
        assert_eq!(
            out.names,
            Some(vec!["foo".to_string(), "bar".to_string()])
        );
    }

    #[test]
    fn test_post_hooks_rewrite_job() {
        let mut registry = HookRegistry::new();
        registry
            .register_post(OVERLAY, |mut job| {
                job.primary_targets.clear();
                job
            })
            .unwrap();

        let job = registry.apply_post(OVERLAY, Job::new());
        assert!(job.primary_targets.is_empty());
    }

    #[test]
    fn test_operations_without_hooks_pass_through() {
        let registry = HookRegistry::new();
        let req = PlanRequest {
            names: Some(vec!["x".to_string()]),
            recurse: true,
        };
        assert_eq!(registry.apply_pre(PLAN_GROUPS, req.clone()), req);
    }
}
