//! Command handlers.
//!
//! Every handler is called through one canonical signature,
//! `(context, positional args, stdin payload)`. Handlers that want fewer
//! parameters are wrapped at registration time; the wrapper is chosen by
//! parameter count, so dispatch is a fixed table over four shapes.

use std::fmt;

use crate::dispatch::{RunContext, StdinPayload};

/// Result returned by handlers and hooks.
pub type HandlerResult = anyhow::Result<()>;

type BareFn = Box<dyn FnMut() -> HandlerResult>;
type ContextFn = Box<dyn FnMut(&mut RunContext<'_>) -> HandlerResult>;
type ArgsFn = Box<dyn FnMut(&mut RunContext<'_>, Vec<String>) -> HandlerResult>;
type FullFn = Box<dyn FnMut(&mut RunContext<'_>, Vec<String>, StdinPayload) -> HandlerResult>;

/// A command handler, tagged by how many of the canonical parameters it
/// takes.
pub enum Handler {
    /// Takes nothing.
    Bare(BareFn),
    /// Takes the context.
    Context(ContextFn),
    /// Takes the context and positional arguments.
    Args(ArgsFn),
    /// Takes the context, positional arguments, and stdin payload.
    Full(FullFn),
}

impl Handler {
    pub fn bare(f: impl FnMut() -> HandlerResult + 'static) -> Self {
        Self::Bare(Box::new(f))
    }

    pub fn context(f: impl FnMut(&mut RunContext<'_>) -> HandlerResult + 'static) -> Self {
        Self::Context(Box::new(f))
    }

    pub fn with_args(
        f: impl FnMut(&mut RunContext<'_>, Vec<String>) -> HandlerResult + 'static,
    ) -> Self {
        Self::Args(Box::new(f))
    }

    pub fn full(
        f: impl FnMut(&mut RunContext<'_>, Vec<String>, StdinPayload) -> HandlerResult + 'static,
    ) -> Self {
        Self::Full(Box::new(f))
    }

    /// A handler that does nothing.
    pub fn noop() -> Self {
        Self::bare(|| Ok(()))
    }

    /// Number of canonical parameters the handler receives.
    pub fn arity(&self) -> usize {
        match self {
            Self::Bare(_) => 0,
            Self::Context(_) => 1,
            Self::Args(_) => 2,
            Self::Full(_) => 3,
        }
    }

    /// Call with the canonical arguments, passing on as many as the handler
    /// takes.
    pub fn call(
        &mut self,
        ctx: &mut RunContext<'_>,
        args: Vec<String>,
        stdin: StdinPayload,
    ) -> HandlerResult {
        match self {
            Self::Bare(f) => f(),
            Self::Context(f) => f(ctx),
            Self::Args(f) => f(ctx, args),
            Self::Full(f) => f(ctx, args, stdin),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler(arity={})", self.arity())
    }
}
