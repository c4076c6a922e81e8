//! Trove specs, resolved trove tuples, and build targets
//!
//! A [`TroveSpec`] is a query: name plus optional version-or-label and
//! flavor, written `name=version[flavor]`. A [`TroveTup`] is a fully
//! resolved `(name, version, flavor)` triple as the repository returns it.
//! A [`JobEntry`] is a trove tuple tagged with its build context inside a
//! job. A [`BuildTarget`] is the rendered string handed to the build
//! orchestrator: `name{context}` or `/path/to.recipe[flavor]{context}`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::flavor::{Flavor, FlavorError};
use super::version::Version;

/// Trove spec parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Empty name part
    #[error("Invalid trove spec '{spec}': empty name")]
    EmptyName { spec: String },

    /// Unbalanced flavor brackets
    #[error("Invalid trove spec '{spec}': unbalanced '[' ']'")]
    UnbalancedBrackets { spec: String },

    /// Bad flavor inside the brackets
    #[error("Invalid trove spec '{spec}': {source}")]
    BadFlavor {
        spec: String,
        #[source]
        source: FlavorError,
    },
}

/// Strip a `:component` suffix, yielding the base package name
pub fn base_name(name: &str) -> &str {
    match name.split_once(':') {
        Some((base, _)) => base,
        None => name,
    }
}

/// Whether a trove name denotes a group
pub fn is_group(name: &str) -> bool {
    base_name(name).starts_with("group-")
}

/// The `:source` component name for a package or group
pub fn source_name(name: &str) -> String {
    format!("{}:source", base_name(name))
}

/// A trove query: name with optional version-or-label and flavor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TroveSpec {
    /// Trove name (may carry a `:component` suffix)
    pub name: String,
    /// Version or label constraint, verbatim
    pub version: Option<String>,
    /// Flavor constraint
    pub flavor: Option<Flavor>,
}

impl TroveSpec {
    /// Spec matching any version and flavor of `name`
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            flavor: None,
        }
    }

    /// Spec constrained to a version-or-label string
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        flavor: Option<Flavor>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            flavor,
        }
    }

    /// Parse `name[=versionOrLabel][[flavor]]`
    pub fn parse(s: &str) -> Result<Self, SpecError> {
        let s = s.trim();
        let (rest, flavor) = match s.find('[') {
            Some(open) => {
                let Some(stripped) = s.ends_with(']').then(|| &s[open + 1..s.len() - 1]) else {
                    return Err(SpecError::UnbalancedBrackets {
                        spec: s.to_string(),
                    });
                };
                let flavor = Flavor::parse(stripped).map_err(|source| SpecError::BadFlavor {
                    spec: s.to_string(),
                    source,
                })?;
                (&s[..open], Some(flavor))
            }
            None => {
                if s.contains(']') {
                    return Err(SpecError::UnbalancedBrackets {
                        spec: s.to_string(),
                    });
                }
                (s, None)
            }
        };

        let (name, version) = match rest.split_once('=') {
            Some((name, version)) => (name, Some(version.to_string())),
            None => (rest, None),
        };
        if name.is_empty() {
            return Err(SpecError::EmptyName {
                spec: s.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            version,
            flavor,
        })
    }
}

impl fmt::Display for TroveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, "={version}")?;
        }
        if let Some(flavor) = &self.flavor {
            write!(f, "[{flavor}]")?;
        }
        Ok(())
    }
}

impl FromStr for TroveSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A fully resolved trove: name, version, flavor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TroveTup {
    pub name: String,
    pub version: Version,
    pub flavor: Flavor,
}

impl TroveTup {
    pub fn new(name: impl Into<String>, version: Version, flavor: Flavor) -> Self {
        Self {
            name: name.into(),
            version,
            flavor,
        }
    }

    /// Tag this trove with a build context
    pub fn with_context(self, context: impl Into<String>) -> JobEntry {
        JobEntry {
            name: self.name,
            version: self.version,
            flavor: self.flavor,
            context: context.into(),
        }
    }
}

impl fmt::Display for TroveTup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.version)?;
        if !self.flavor.is_empty() {
            write!(f, "[{}]", self.flavor)?;
        }
        Ok(())
    }
}

/// One entry of a job's trove list: a resolved trove plus its context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobEntry {
    pub name: String,
    pub version: Version,
    pub flavor: Flavor,
    pub context: String,
}

impl JobEntry {
    /// Whether two entries name the same trove, ignoring context
    ///
    /// Duplicate detection in jobs compares `(name, version, flavor)`
    /// exactly; the context tag is bookkeeping.
    pub fn same_trove(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.flavor == other.flavor
    }

    /// The resolved trove without its context tag
    pub fn trove(&self) -> TroveTup {
        TroveTup {
            name: self.name.clone(),
            version: self.version.clone(),
            flavor: self.flavor.clone(),
        }
    }
}

impl fmt::Display for JobEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.version)?;
        if !self.flavor.is_empty() {
            write!(f, "[{}]", self.flavor)?;
        }
        write!(f, "{{{}}}", self.context)
    }
}

/// A rendered build-job input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    /// Build the repository HEAD of a named trove
    Repository { name: String, context: String },
    /// Build a local in-progress recipe, optionally pinned to a flavor
    Recipe {
        path: PathBuf,
        flavor: Option<Flavor>,
        context: String,
    },
}

impl BuildTarget {
    /// The context the target is tagged with
    pub fn context(&self) -> &str {
        match self {
            Self::Repository { context, .. } | Self::Recipe { context, .. } => context,
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository { name, context } => write!(f, "{name}{{{context}}}"),
            Self::Recipe {
                path,
                flavor,
                context,
            } => {
                write!(f, "{}", path.display())?;
                if let Some(flavor) = flavor {
                    write!(f, "[{flavor}]")?;
                }
                write!(f, "{{{context}}}")
            }
        }
    }
}
