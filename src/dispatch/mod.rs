//! Segmentation and dispatch plumbing.
//!
//! - [`segmenter`] - Splits argv into global options, command, and command options
//! - [`context`] - The [`RunContext`] handed to handlers
//! - [`stdin`] - The stdin payload handed to handlers
//! - [`hooks`] - Before, after, and stdin hooks
//! - [`help`] - Usage banners and help text
//!
//! The dispatcher itself is [`crate::Application::run`].

pub mod context;
pub mod help;
pub mod hooks;
pub mod segmenter;
pub mod stdin;

pub use context::RunContext;
pub use hooks::Hooks;
pub use segmenter::{ArgumentSegmenter, Segmentation};
pub use stdin::StdinPayload;
