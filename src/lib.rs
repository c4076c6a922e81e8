//! Forgeplan - Build job composition for product definitions
//!
//! This library turns a product definition plus local source checkouts
//! into concrete build jobs for a remote build orchestrator.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Composition logic (contexts, planning, overlay, merging)
//! - [`repo`] - Package repository client
//! - [`orchestrator`] - Build orchestrator client
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod repo;
