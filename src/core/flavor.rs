//! Build flavors
//!
//! A flavor is a structured set of build options: architecture tokens plus
//! use flags, each flag carrying a sense (required, preferred, prefer-not,
//! disallowed). Flavors compare structurally, never by string, but render
//! to a canonical string form such as `ssl,!bootstrap is: x86`.
//!
//! The short descriptor (architecture tokens) feeds context naming; when a
//! flavor has no architecture the full canonical string stands in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flavor parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlavorError {
    /// Empty flag name after a sense prefix
    #[error("Invalid flavor '{flavor}': empty use flag")]
    EmptyFlag { flavor: String },

    /// Flag or architecture token contains unexpected characters
    #[error("Invalid flavor token '{token}'")]
    BadToken { token: String },
}

/// Sense of one use flag within a flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sense {
    /// Flag must be on (no prefix)
    Required,
    /// Flag should be on if possible (`~` prefix)
    Preferred,
    /// Flag should be off if possible (`~!` prefix)
    PreferNot,
    /// Flag must be off (`!` prefix)
    Disallowed,
}

impl Sense {
    fn prefix(self) -> &'static str {
        match self {
            Self::Required => "",
            Self::Preferred => "~",
            Self::PreferNot => "~!",
            Self::Disallowed => "!",
        }
    }
}

/// A structured build flavor
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Flavor {
    /// Architecture tokens (the `is:` part), e.g. `x86`, `x86_64`
    arch: BTreeSet<String>,
    /// Use flags with their senses
    flags: BTreeMap<String, Sense>,
}

impl Flavor {
    /// The empty flavor (no architecture, no flags)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a flavor from its canonical string form
    ///
    /// Accepts `flag,~other,!off is: x86 x86_64`, either half optional.
    pub fn parse(s: &str) -> Result<Self, FlavorError> {
        let s = s.trim();
        let mut flavor = Self::default();
        if s.is_empty() {
            return Ok(flavor);
        }

        let (flag_part, arch_part) = match s.split_once("is:") {
            Some((flags, arch)) => (flags.trim(), arch.trim()),
            None => (s, ""),
        };

        for token in arch_part.split_whitespace() {
            if !token.chars().all(valid_token_char) {
                return Err(FlavorError::BadToken {
                    token: token.to_string(),
                });
            }
            flavor.arch.insert(token.to_string());
        }

        for raw in flag_part.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let (sense, name) = if let Some(rest) = raw.strip_prefix("~!") {
                (Sense::PreferNot, rest)
            } else if let Some(rest) = raw.strip_prefix('~') {
                (Sense::Preferred, rest)
            } else if let Some(rest) = raw.strip_prefix('!') {
                (Sense::Disallowed, rest)
            } else {
                (Sense::Required, raw)
            };
            if name.is_empty() {
                return Err(FlavorError::EmptyFlag {
                    flavor: s.to_string(),
                });
            }
            if !name.chars().all(valid_token_char) {
                return Err(FlavorError::BadToken {
                    token: name.to_string(),
                });
            }
            flavor.flags.insert(name.to_string(), sense);
        }

        Ok(flavor)
    }

    /// Whether this is the empty flavor
    pub fn is_empty(&self) -> bool {
        self.arch.is_empty() && self.flags.is_empty()
    }

    /// Architecture tokens
    pub fn arch(&self) -> impl Iterator<Item = &str> {
        self.arch.iter().map(String::as_str)
    }

    /// Short human-readable descriptor, used for context naming
    ///
    /// Architecture tokens joined with `_`; falls back to the canonical
    /// string when the flavor carries no architecture.
    pub fn descriptor(&self) -> String {
        if self.arch.is_empty() {
            self.to_string()
        } else {
            self.arch.iter().cloned().collect::<Vec<_>>().join("_")
        }
    }

    /// Merge `other` on top of this flavor
    ///
    /// Other's flags win on conflict; architectures union. Used to apply a
    /// build definition's flavor override onto the product base flavor.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.arch.extend(other.arch.iter().cloned());
        for (name, sense) in &other.flags {
            out.flags.insert(name.clone(), *sense);
        }
        out
    }
}

fn valid_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self
            .flags
            .iter()
            .map(|(name, sense)| format!("{}{}", sense.prefix(), name))
            .collect::<Vec<_>>()
            .join(",");
        let arch = self.arch.iter().cloned().collect::<Vec<_>>().join(" ");
        match (flags.is_empty(), arch.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => write!(f, "{flags}"),
            (true, false) => write!(f, "is: {arch}"),
            (false, false) => write!(f, "{flags} is: {arch}"),
        }
    }
}

impl FromStr for Flavor {
    type Err = FlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Flavor {
    type Error = FlavorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Flavor> for String {
    fn from(flavor: Flavor) -> Self {
        flavor.to_string()
    }
}
