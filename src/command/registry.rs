//! Command definitions and the registry that resolves them.
//!
//! The [`CommandRegistry`] stores each declared [`Command`] once and maps
//! canonical names (and aliases) to it. An alias shares the command it
//! points to: a change made through one name is visible through the other.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crate::dispatch::{RunContext, StdinPayload};
use crate::options::{OptionParser, OptionSpec, OptionValues};

use super::handler::{Handler, HandlerResult};
use super::lifecycle::Lifecycle;
use super::name::CommandName;

/// One declared subcommand.
///
/// # Example
///
/// ```
/// use drydock::command::{Command, Handler};
/// use drydock::options::{OptionSpec, ValueType};
///
/// let cmd = Command::new("date", Handler::context(|ctx| {
///     let _format = ctx.options().str("format");
///     Ok(())
/// }))
/// .description("Display the current date")
/// .option(OptionSpec::new('f', "format").value(ValueType::String).help("Date format"));
///
/// assert_eq!(cmd.name().as_str(), "date");
/// assert_eq!(cmd.parser().specs().len(), 1);
/// ```
pub struct Command {
    name: CommandName,
    description: Option<String>,
    handler: Handler,
    parser: OptionParser,
    lifecycle: Option<Box<dyn Lifecycle>>,
    index: usize,
}

impl Command {
    pub fn new(name: &str, handler: Handler) -> Self {
        Self {
            name: CommandName::new(name),
            description: None,
            handler,
            parser: OptionParser::new(),
            lifecycle: None,
            index: 0,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a command-specific option.
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.parser.declare(spec);
        self
    }

    /// Set the usage banner shown by `<command> --help`.
    pub fn usage(mut self, banner: impl Into<String>) -> Self {
        self.parser.set_banner(banner);
        self
    }

    /// Hand this command's arguments over verbatim, without parsing.
    pub fn ignore_options(mut self) -> Self {
        self.parser.ignore();
        self
    }

    /// Attach lifecycle methods.
    pub fn lifecycle(mut self, lifecycle: impl Lifecycle + 'static) -> Self {
        self.lifecycle = Some(Box::new(lifecycle));
        self
    }

    pub fn name(&self) -> &CommandName {
        &self.name
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn parser(&self) -> &OptionParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut OptionParser {
        &mut self.parser
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn has_lifecycle(&self) -> bool {
        self.lifecycle.is_some()
    }

    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Build a context and run the lifecycle methods and the handler.
    pub fn invoke(
        &mut self,
        invoked_as: &str,
        globals: OptionValues,
        options: OptionValues,
        args: Vec<String>,
        stdin: StdinPayload,
        out: &mut dyn Write,
    ) -> HandlerResult {
        let mut ctx = RunContext::new(
            invoked_as,
            self.name.clone(),
            self.description.clone(),
            globals,
            options,
            out,
        );

        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.init(&mut ctx)?;
            lifecycle.validate(&ctx)?;
            lifecycle.print_header(&mut ctx)?;
        }

        self.handler.call(&mut ctx, args, stdin)?;

        if let Some(lifecycle) = self.lifecycle.as_mut() {
            lifecycle.print_footer(&mut ctx)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("handler", &self.handler)
            .field("parser", &self.parser)
            .field("lifecycle", &self.lifecycle.is_some())
            .field("index", &self.index)
            .finish()
    }
}

/// Registry of declared commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    by_name: HashMap<CommandName, usize>,
    order: Vec<CommandName>,
    default: Option<CommandName>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its canonical name.
    ///
    /// Registering a name twice replaces the entry; aliases made for the
    /// earlier command keep pointing at it.
    pub fn register(&mut self, mut command: Command) -> &mut Command {
        let index = self.commands.len();
        command.index = index;
        let name = command.name.clone();

        if self.by_name.insert(name.clone(), index).is_some() {
            tracing::warn!("command '{}' declared more than once; last one wins", name);
        }
        if !self.order.contains(&name) {
            self.order.push(name);
        }

        self.commands.push(command);
        &mut self.commands[index]
    }

    /// Point `alias` at the command registered as `target`.
    ///
    /// Returns `false` (and changes nothing) when `target` is unknown.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        let Some(&index) = self.by_name.get(&CommandName::new(target)) else {
            tracing::debug!("alias '{}' ignored: no command '{}'", alias, target);
            return false;
        };
        self.by_name.insert(CommandName::new(alias), index);
        true
    }

    /// Set the default command by name. The name is checked at dispatch.
    pub fn set_default(&mut self, name: &str) {
        self.default = Some(CommandName::new(name));
    }

    pub fn default_name(&self) -> Option<&CommandName> {
        self.default.as_ref()
    }

    /// Look up a command by any spelling of its name or an alias.
    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.by_name
            .get(&CommandName::new(name))
            .map(|&index| &self.commands[index])
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.by_name
            .get(&CommandName::new(name))
            .map(|&index| &mut self.commands[index])
    }

    /// Whether `name` resolves to a command.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&CommandName::new(name))
    }

    /// Commands in declaration order (aliases excluded).
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .map(|&index| &self.commands[index])
    }

    /// Every registered command, including ones replaced by a later
    /// declaration but still reachable through an alias.
    pub(crate) fn declared(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Display names of all declared commands, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.order.iter().map(CommandName::display_name).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
