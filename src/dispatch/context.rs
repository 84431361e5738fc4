//! Per-invocation context handed to command handlers.

use std::io::Write;

use serde_json::json;

use crate::command::CommandName;
use crate::options::OptionValues;

/// Everything a handler needs to know about the current invocation.
///
/// Created by the dispatcher for one run and dropped when the handler
/// returns. Positional arguments and the stdin payload are passed to the
/// handler alongside it.
pub struct RunContext<'a> {
    invoked_as: String,
    name: CommandName,
    description: Option<String>,
    globals: OptionValues,
    options: OptionValues,
    out: &'a mut dyn Write,
}

impl<'a> RunContext<'a> {
    /// Create a context for `name`, invoked as `invoked_as` (an alias or the
    /// name itself).
    pub fn new(
        invoked_as: impl Into<String>,
        name: CommandName,
        description: Option<String>,
        globals: OptionValues,
        options: OptionValues,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            invoked_as: invoked_as.into(),
            name,
            description,
            globals,
            options,
            out,
        }
    }

    /// The name typed on the command line (may be an alias).
    pub fn invoked_as(&self) -> &str {
        &self.invoked_as
    }

    /// The command's canonical name.
    pub fn name(&self) -> &CommandName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resolved global options.
    pub fn globals(&self) -> &OptionValues {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut OptionValues {
        &mut self.globals
    }

    /// Resolved command-specific options.
    pub fn options(&self) -> &OptionValues {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionValues {
        &mut self.options
    }

    /// Output sink for handler output.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Snapshot of the context as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "command": self.name.as_str(),
            "invoked_as": self.invoked_as,
            "description": self.description,
            "globals": self.globals,
            "options": self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(out: &mut Vec<u8>) -> RunContext<'_> {
        let mut globals = OptionValues::new();
        globals.set("verbose", true);
        let mut options = OptionValues::new();
        options.set("format", "yaml");
        RunContext::new(
            "ls",
            CommandName::new("list"),
            Some("List things".into()),
            globals,
            options,
            out,
        )
    }

    #[test]
    fn exposes_names_and_values() {
        let mut buf = Vec::new();
        let ctx = context(&mut buf);
        assert_eq!(ctx.invoked_as(), "ls");
        assert_eq!(ctx.name().as_str(), "list");
        assert_eq!(ctx.description(), Some("List things"));
        assert!(ctx.globals().flag("verbose"));
        assert_eq!(ctx.options().str("format"), Some("yaml"));
    }

    #[test]
    fn views_are_writable() {
        let mut buf = Vec::new();
        let mut ctx = context(&mut buf);
        ctx.options_mut().set("format", "json");
        ctx.globals_mut().remove("verbose");
        assert_eq!(ctx.options().str("format"), Some("json"));
        assert!(!ctx.globals().flag("verbose"));
    }

    #[test]
    fn writes_go_to_sink() {
        let mut buf = Vec::new();
        {
            let mut ctx = context(&mut buf);
            writeln!(ctx.out(), "hello").unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "hello\n");
    }

    #[test]
    fn json_snapshot() {
        let mut buf = Vec::new();
        let ctx = context(&mut buf);
        let value = ctx.to_json();
        assert_eq!(value["command"], "list");
        assert_eq!(value["globals"]["verbose"], true);
        assert_eq!(value["options"]["format"], "yaml");
    }
}
