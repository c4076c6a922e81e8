//! Output formatting and progress indicators
//!
//! Utilities for spinners, status glyphs, and error display, plus the
//! global output configuration derived from CLI flags.

use std::sync::OnceLock;

use indicatif::{ProgressBar, ProgressStyle};

/// Global output configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress non-error output
    pub quiet: bool,
    /// Emit JSON where supported
    pub json: bool,
    /// Verbosity level (0 = warn, 1 = info, 2+ = debug)
    pub verbose: u8,
}

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Install this configuration process-wide (first call wins)
    pub fn apply_global(self) {
        let _ = OUTPUT.set(self);
    }

    fn global() -> Self {
        OUTPUT.get().copied().unwrap_or_default()
    }
}

/// Whether non-error output is suppressed
pub fn is_quiet() -> bool {
    OutputConfig::global().quiet
}

/// Whether JSON output was requested
pub fn is_json() -> bool {
    OutputConfig::global().json
}

/// Print a line unless quiet mode is on
pub fn println_unless_quiet(message: &str) {
    if !is_quiet() {
        println!("{message}");
    }
}

/// Display a top-level error to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", status::ERROR);
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
