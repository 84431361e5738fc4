//! Application-level hooks run around every dispatch.

use std::fmt;
use std::io::Read;

use crate::command::HandlerResult;

use super::stdin::StdinPayload;

type HookFn = Box<dyn FnMut() -> HandlerResult>;
type StdinFn = Box<dyn FnMut(Box<dyn Read>) -> anyhow::Result<StdinPayload>>;

/// Before, after, and stdin hooks. Each is optional.
#[derive(Default)]
pub struct Hooks {
    before: Option<HookFn>,
    after: Option<HookFn>,
    stdin: Option<StdinFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_before(&mut self, f: impl FnMut() -> HandlerResult + 'static) {
        self.before = Some(Box::new(f));
    }

    pub fn set_after(&mut self, f: impl FnMut() -> HandlerResult + 'static) {
        self.after = Some(Box::new(f));
    }

    pub fn set_stdin(
        &mut self,
        f: impl FnMut(Box<dyn Read>) -> anyhow::Result<StdinPayload> + 'static,
    ) {
        self.stdin = Some(Box::new(f));
    }

    pub fn run_before(&mut self) -> HandlerResult {
        match self.before.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    pub fn run_after(&mut self) -> HandlerResult {
        match self.after.as_mut() {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    /// Turn the raw input source into the payload handed to the handler.
    /// Without a stdin hook the source is passed through as a stream.
    pub fn prepare_stdin(&mut self, source: Box<dyn Read>) -> anyhow::Result<StdinPayload> {
        match self.stdin.as_mut() {
            Some(f) => f(source),
            None => Ok(StdinPayload::Stream(source)),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("stdin", &self.stdin.is_some())
            .finish()
    }
}
