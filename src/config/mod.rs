//! Configuration and constants
//!
//! Compile-time defaults live in [`defaults`]; user-level settings come
//! from the global config file handled by [`crate::core::global_config`].

pub mod defaults;
