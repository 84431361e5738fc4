//! Commands and their registry.
//!
//! - [`name`] - Canonical command names
//! - [`handler`] - Handlers and their parameter-count table
//! - [`lifecycle`] - Optional lifecycle methods around a handler
//! - [`registry`] - [`Command`] definitions and the [`CommandRegistry`]

pub mod handler;
pub mod lifecycle;
pub mod name;
pub mod registry;

pub use handler::{Handler, HandlerResult};
pub use lifecycle::Lifecycle;
pub use name::{canonicalize, decanonicalize, CommandName};
pub use registry::{Command, CommandRegistry};
