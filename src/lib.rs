//! Drydock - Declarative command-line application framework.
//!
//! A program declares global options, commands with their own options,
//! aliases, a default command, and hooks. Drydock then splits the argument
//! vector into global options, a command, command options, and positional
//! arguments, and invokes the command's handler.
//!
//! # Modules
//!
//! - [`app`] - The [`Application`] declaration surface and dispatcher
//! - [`command`] - Commands, handlers, lifecycle methods, and the registry
//! - [`config`] - Runtime settings and environment overrides
//! - [`dispatch`] - Argument segmentation, run context, hooks, and help text
//! - [`error`] - Error types and result aliases
//! - [`options`] - Option declarations and parsing
//! - [`output`] - Output sinks and capture buffers
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use drydock::{Application, Command, Handler, OptionSpec};
//! use drydock::output::CaptureBuffer;
//!
//! let capture = CaptureBuffer::new();
//! let mut app = Application::new("greet").with_output(capture.sink());
//! app.global_option(OptionSpec::new('l', "loud"));
//! app.command(Command::new("hello", Handler::context(|ctx| {
//!     let text = if ctx.globals().flag("loud") { "HELLO" } else { "hello" };
//!     writeln!(ctx.out(), "{}", text)?;
//!     Ok(())
//! })));
//! app.default_command("hello");
//!
//! app.run(["--loud"], std::io::empty()).unwrap();
//! assert_eq!(capture.contents(), "HELLO\n");
//! ```

pub mod app;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod output;

pub use app::{Application, Scope};
pub use command::{Command, CommandName, Handler, HandlerResult, Lifecycle};
pub use config::{DebugToggle, Settings};
pub use dispatch::{RunContext, StdinPayload};
pub use error::{DrydockError, Result};
pub use options::{OptionSpec, OptionValue, OptionValues, ValueType};
