//! Core composition logic
//!
//! Everything needed to turn a product definition plus local checkouts
//! into a submittable build job. No I/O beyond the collaborator traits.
//!
//! # Submodules
//!
//! - [`label`] - Repository label parsing
//! - [`flavor`] - Structured build flavors
//! - [`version`] - Trove versions and ordering
//! - [`spec`] - Trove specs, tuples, and build targets
//! - [`searchpath`] - Prioritized upstream sources
//! - [`context`] - Flavor → context naming
//! - [`resolver`] - Multi-source package lookup
//! - [`product`] - Product definition (product.toml)
//! - [`checkout`] - Local checkout discovery
//! - [`job`] - Jobs, build configs, and overlay
//! - [`groups`] - Group build planning
//! - [`packages`] - Edited-package overlay planning
//! - [`composer`] - Composition facade
//! - [`hooks`] - Pre/post hook registry
//! - [`global_config`] - Global configuration management

pub mod checkout;
pub mod composer;
pub mod context;
pub mod flavor;
pub mod global_config;
pub mod groups;
pub mod hooks;
pub mod job;
pub mod label;
pub mod packages;
pub mod product;
pub mod resolver;
pub mod searchpath;
pub mod spec;
pub mod version;
