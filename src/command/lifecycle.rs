//! Optional lifecycle methods around a command handler.
//!
//! A command may carry a [`Lifecycle`] implementation. Every method has a
//! no-op default, so an implementation only overrides the steps it needs.
//! The dispatcher calls them in this order:
//!
//! `init` → `validate` → `print_header` → handler → `print_footer`
//!
//! An error from any step aborts the run.

use crate::dispatch::RunContext;

use super::handler::HandlerResult;

/// Hooks a command variant may implement.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use drydock::command::Lifecycle;
/// use drydock::dispatch::RunContext;
///
/// struct Banner;
///
/// impl Lifecycle for Banner {
///     fn print_header(&mut self, ctx: &mut RunContext<'_>) -> anyhow::Result<()> {
///         let name = ctx.name().to_string();
///         writeln!(ctx.out(), "== {} ==", name)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Lifecycle {
    /// Called before anything else, with the populated context.
    fn init(&mut self, _ctx: &mut RunContext<'_>) -> HandlerResult {
        Ok(())
    }

    /// Reject the invocation by returning an error.
    fn validate(&self, _ctx: &RunContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn print_header(&mut self, _ctx: &mut RunContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn print_footer(&mut self, _ctx: &mut RunContext<'_>) -> HandlerResult {
        Ok(())
    }
}
