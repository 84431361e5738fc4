//! Command name canonicalization.
//!
//! Commands are looked up by their canonical name: hyphens become
//! underscores, so `dry-run` and `dry_run` name the same command. The
//! reverse substitution is only used for display and is lossy for names that
//! mix both characters.

use std::fmt;

/// Canonical, underscore-normalized command name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandName(String);

impl CommandName {
    /// Canonicalize a name as typed by a user or a declaration.
    pub fn new(name: &str) -> Self {
        Self(canonicalize(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as shown to users (underscores become hyphens).
    pub fn display_name(&self) -> String {
        decanonicalize(&self.0)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommandName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CommandName {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Replace `-` with `_`.
pub fn canonicalize(name: &str) -> String {
    name.replace('-', "_")
}

/// Replace `_` with `-`.
pub fn decanonicalize(name: &str) -> String {
    name.replace('_', "-")
}
