//! Error types for Drydock operations.
//!
//! This module defines [`DrydockError`], the error type returned by the
//! dispatcher, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Framework errors (`UnknownCommand`, `NoCommandsDefined`,
//!   `InvalidArgument`, `MissingArgument`) carry structured data so callers
//!   never need to parse a message
//! - Errors raised by user hooks and handlers travel through
//!   `DrydockError::Hook` untouched and can be recovered with `downcast_ref`
//! - Errors from the parsing backend never leak; they are re-wrapped into the
//!   framework's own argument errors

use thiserror::Error;

/// Core error type for Drydock operations.
#[derive(Debug, Error)]
pub enum DrydockError {
    /// The command token (or the default command) has no registry entry.
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    /// `run` was called before any command was declared.
    #[error("No commands defined")]
    NoCommandsDefined,

    /// One or more flags were not recognized, or a value was rejected.
    #[error("Unknown option: {}", args.join(", "))]
    InvalidArgument { args: Vec<String> },

    /// A flag that takes a value was given none.
    #[error("Option requires a value: {}", args.join(", "))]
    MissingArgument { args: Vec<String> },

    /// An option declaration cannot be turned into a parser.
    #[error("Invalid option declaration: {message}")]
    InvalidDeclaration { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by a hook, lifecycle method, or command handler.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl DrydockError {
    /// Build an `UnknownCommand` error, substituting `unknown` when no name
    /// was available.
    pub fn unknown_command(name: Option<&str>) -> Self {
        Self::UnknownCommand {
            name: name.unwrap_or("unknown").to_string(),
        }
    }

    /// True for `InvalidArgument` and its refinement `MissingArgument`.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::MissingArgument { .. }
        )
    }

    /// The offending flag tokens of an argument error.
    pub fn offending_args(&self) -> Option<&[String]> {
        match self {
            Self::InvalidArgument { args } | Self::MissingArgument { args } => Some(args),
            _ => None,
        }
    }
}

/// Result type alias for Drydock operations.
pub type Result<T> = std::result::Result<T, DrydockError>;
