//! Repository label parsing and formatting
//!
//! A label names one branch of the repository namespace and has the form
//! `host@namespace:tag`, e.g. `products.example.com@prod:devel`. Stages of
//! a product bind to labels; search-path entries and trove versions carry
//! them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// Not in host@namespace:tag form
    #[error("Invalid label '{label}': expected host@namespace:tag")]
    Invalid { label: String },
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<host>[A-Za-z0-9][A-Za-z0-9.\-]*)@(?P<ns>[A-Za-z0-9.\-]+):(?P<tag>[A-Za-z0-9.\-]+)$")
            .expect("label pattern is valid")
    })
}

/// A repository branch label (`host@namespace:tag`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
    host: String,
    namespace: String,
    tag: String,
}

impl Label {
    /// Parse a label from its canonical string form
    pub fn parse(s: &str) -> Result<Self, LabelError> {
        let caps = label_pattern()
            .captures(s)
            .ok_or_else(|| LabelError::Invalid {
                label: s.to_string(),
            })?;
        Ok(Self {
            host: caps["host"].to_string(),
            namespace: caps["ns"].to_string(),
            tag: caps["tag"].to_string(),
        })
    }

    /// Repository host part
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Namespace part
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Tag part (typically the stage name)
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.host, self.namespace, self.tag)
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Label {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}
