//! The application: declaration surface and dispatcher.
//!
//! An [`Application`] is populated at startup through builder calls (global
//! options, commands, aliases, default, hooks, banners) and then run once
//! against an argument vector and an input source.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use drydock::{Application, Command, Handler, OptionSpec, ValueType};
//! use drydock::output::CaptureBuffer;
//!
//! let capture = CaptureBuffer::new();
//! let mut app = Application::new("example").with_output(capture.sink());
//! app.global_option(OptionSpec::new('v', "verbose"));
//! app.command(
//!     Command::new("deploy", Handler::with_args(|ctx, args| {
//!         let target = ctx.options().str("target").unwrap_or("dev").to_string();
//!         writeln!(ctx.out(), "deploying {} to {}", args.join(" "), target)?;
//!         Ok(())
//!     }))
//!     .option(OptionSpec::new('t', "target").value(ValueType::String)),
//! );
//!
//! app.run(["deploy", "--target=prod", "web"], std::io::empty()).unwrap();
//! assert_eq!(capture.contents(), "deploying web to prod\n");
//! ```

use std::io::{self, Read, Write};
use std::process::ExitCode;

use console::{style, Term};

use crate::command::{Command, CommandName, CommandRegistry, Handler, HandlerResult};
use crate::config::{DebugToggle, Settings};
use crate::dispatch::{ArgumentSegmenter, Hooks, Segmentation, StdinPayload};
use crate::error::{DrydockError, Result};
use crate::options::{OptionParser, OptionSpec, OptionValues, ParseOutcome};
use crate::output::{self, Output};

/// Name of the command declared by [`Application::default_handler`].
pub const DEFAULT_COMMAND: &str = "default";

/// Which option set a declaration targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    Command(CommandName),
}

impl Scope {
    pub fn command(name: &str) -> Self {
        Self::Command(CommandName::new(name))
    }
}

/// A declared command-line application.
pub struct Application {
    settings: Settings,
    global: OptionParser,
    registry: CommandRegistry,
    hooks: Hooks,
    output: Output,
    has_run: bool,
}

impl Application {
    /// Create an application writing to the terminal.
    pub fn new(program_name: impl Into<String>) -> Self {
        Self::with_settings(Settings::new(program_name))
    }

    /// Create an application configured from the running process.
    pub fn from_env() -> Self {
        Self::with_settings(Settings::from_env())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            global: OptionParser::new(),
            registry: CommandRegistry::new(),
            hooks: Hooks::new(),
            output: output::terminal(),
            has_run: false,
        }
    }

    /// Replace the output sink.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Turn debug output on, off, or flip it.
    pub fn debug(&mut self, toggle: DebugToggle) -> &mut Self {
        self.settings.apply(toggle);
        self
    }

    pub fn is_debug(&self) -> bool {
        self.settings.debug
    }

    /// Declare a global option. Returns its key.
    pub fn global_option(&mut self, spec: OptionSpec) -> String {
        self.global.declare(spec)
    }

    /// Declare an option for an already declared command. Returns its key,
    /// or `None` when the command is unknown.
    pub fn option(&mut self, command: &str, spec: OptionSpec) -> Option<String> {
        self.registry
            .resolve_mut(command)
            .map(|cmd| cmd.parser_mut().declare(spec))
    }

    /// Declare an option in `scope`.
    pub fn declare(&mut self, scope: &Scope, spec: OptionSpec) -> Option<String> {
        self.option_parser_mut(scope).map(|parser| parser.declare(spec))
    }

    /// The option parser of a scope.
    pub fn option_parser(&self, scope: &Scope) -> Option<&OptionParser> {
        match scope {
            Scope::Global => Some(&self.global),
            Scope::Command(name) => self.registry.resolve(name.as_str()).map(Command::parser),
        }
    }

    pub fn option_parser_mut(&mut self, scope: &Scope) -> Option<&mut OptionParser> {
        match scope {
            Scope::Global => Some(&mut self.global),
            Scope::Command(name) => self
                .registry
                .resolve_mut(name.as_str())
                .map(Command::parser_mut),
        }
    }

    /// Remove the flags of `scope` from `argv` and return their values.
    pub fn consume(&self, scope: &Scope, argv: &mut Vec<String>) -> Result<OptionValues> {
        let parser = self.option_parser(scope).ok_or_else(|| match scope {
            Scope::Command(name) => DrydockError::unknown_command(Some(name.as_str())),
            Scope::Global => DrydockError::unknown_command(None),
        })?;
        parser.consume(argv)
    }

    /// Declare a command.
    pub fn command(&mut self, command: Command) -> &mut Command {
        tracing::trace!("declaring command '{}'", command.name());
        self.registry.register(command)
    }

    /// Set the description of a declared command.
    pub fn describe(&mut self, command: &str, description: impl Into<String>) -> bool {
        match self.registry.resolve_mut(command) {
            Some(cmd) => {
                cmd.set_description(description);
                true
            }
            None => false,
        }
    }

    /// Make `alias` another name for `target`. Ignored when `target` is not
    /// declared.
    pub fn alias_command(&mut self, alias: &str, target: &str) -> bool {
        self.registry.alias(alias, target)
    }

    /// [`Application::alias_command`] with the arguments swapped.
    pub fn command_alias(&mut self, target: &str, alias: &str) -> bool {
        self.registry.alias(alias, target)
    }

    /// Run `name` when no command is given.
    pub fn default_command(&mut self, name: &str) -> &mut Self {
        self.registry.set_default(name);
        self
    }

    /// Declare a command named `default` and make it the default.
    pub fn default_handler(&mut self, handler: Handler) -> &mut Command {
        self.default_handler_named(DEFAULT_COMMAND, handler)
    }

    /// Declare a command named `name` and make it the default.
    pub fn default_handler_named(&mut self, name: &str, handler: Handler) -> &mut Command {
        self.registry.set_default(name);
        self.registry.register(Command::new(name, handler))
    }

    /// Run `f` after parsing, before the command.
    pub fn before(&mut self, f: impl FnMut() -> HandlerResult + 'static) -> &mut Self {
        self.hooks.set_before(f);
        self
    }

    /// Run `f` after the command has succeeded.
    pub fn after(&mut self, f: impl FnMut() -> HandlerResult + 'static) -> &mut Self {
        self.hooks.set_after(f);
        self
    }

    /// Pre-process the input source; the result is the handler's stdin.
    pub fn stdin(
        &mut self,
        f: impl FnMut(Box<dyn Read>) -> anyhow::Result<StdinPayload> + 'static,
    ) -> &mut Self {
        self.hooks.set_stdin(f);
        self
    }

    /// Usage banner for `--help`.
    pub fn global_usage(&mut self, banner: impl Into<String>) -> &mut Self {
        self.global.set_banner(banner);
        self
    }

    /// Usage banner for `<command> --help`.
    pub fn usage(&mut self, command: &str, banner: impl Into<String>) -> bool {
        match self.registry.resolve_mut(command) {
            Some(cmd) => {
                cmd.parser_mut().set_banner(banner);
                true
            }
            None => false,
        }
    }

    /// Pass a command's arguments through without parsing them.
    pub fn ignore_options(&mut self, command: &str) -> bool {
        match self.registry.resolve_mut(command) {
            Some(cmd) => {
                cmd.parser_mut().ignore();
                true
            }
            None => false,
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Display names of declared commands, in declaration order.
    pub fn command_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn is_command(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.registry.resolve(name)
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.registry.resolve_mut(name)
    }

    /// Whether `run` has been called.
    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Parse `argv` and run the selected command.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    ///
    /// Order: check that commands exist, segment `argv`, resolve the command,
    /// apply the stdin hook, run the before hook, invoke the command, run the
    /// after hook. An error at any step ends the run; the after hook does not
    /// run in that case. `--help` prints help to the output sink and skips
    /// the hooks and the command.
    pub fn run<I, S>(&mut self, argv: I, stdin: impl Read + 'static) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.has_run {
            tracing::debug!("already run; ignoring");
            return Ok(());
        }
        self.has_run = true;

        if self.registry.is_empty() {
            return Err(DrydockError::NoCommandsDefined);
        }
        self.validate_declarations()?;

        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        tracing::debug!("dispatching {:?}", argv);

        let segmenter =
            ArgumentSegmenter::new(&self.settings.program_name, &self.global, &self.registry);
        let Segmentation {
            globals,
            command,
            options,
            args,
        } = match segmenter.segment(argv)? {
            ParseOutcome::Parsed(segmentation) => segmentation,
            ParseOutcome::Help(text) => {
                self.output.write_all(text.as_bytes())?;
                self.output.flush()?;
                return Ok(());
            }
        };

        if !self.registry.contains(&command) {
            return Err(DrydockError::unknown_command(Some(&command)));
        }

        let payload = self.hooks.prepare_stdin(Box::new(stdin))?;
        self.hooks.run_before()?;

        let cmd = self
            .registry
            .resolve_mut(&command)
            .ok_or_else(|| DrydockError::unknown_command(Some(&command)))?;
        tracing::debug!("invoking '{}' as '{}'", cmd.name(), command);
        cmd.invoke(&command, globals, options, args, payload, self.output.as_mut())?;
        self.output.flush()?;

        self.hooks.run_after()?;
        Ok(())
    }

    /// Run with the process's arguments and stdin, report any error on
    /// stderr, and return the exit status.
    pub fn main(mut self) -> ExitCode {
        install_interrupt_handler();
        let argv: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        match self.run(argv, io::stdin()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                self.report(&err);
                ExitCode::from(1)
            }
        }
    }

    /// Print a one-line diagnostic for `err` on stderr, with the source chain
    /// when debug is on.
    pub fn report(&self, err: &DrydockError) {
        let term = Term::stderr();
        let _ = term.write_line(&format!("{} {}", style("ERROR:").red().bold(), err));
        if !self.settings.debug {
            return;
        }
        match err {
            DrydockError::Hook(inner) => {
                let _ = term.write_line(&format!("{:?}", inner));
            }
            other => {
                let mut source = std::error::Error::source(other);
                while let Some(cause) = source {
                    let _ = term.write_line(&format!("  caused by: {}", cause));
                    source = cause.source();
                }
            }
        }
    }

    fn validate_declarations(&self) -> Result<()> {
        self.global.validate()?;
        self.registry
            .declared()
            .try_for_each(|cmd| cmd.parser().validate())
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("settings", &self.settings)
            .field("global", &self.global)
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .field("has_run", &self.has_run)
            .finish()
    }
}

fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        println!("\nExiting...");
        std::process::exit(1);
    });
    if let Err(e) = installed {
        tracing::debug!("interrupt handler not installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CaptureBuffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn app_with_log() -> (Application, Log, CaptureBuffer) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let capture = CaptureBuffer::new();
        let mut app = Application::new("example").with_output(capture.sink());
        let (before, after) = (log.clone(), log.clone());
        app.before(move || {
            before.borrow_mut().push("before".into());
            Ok(())
        });
        app.after(move || {
            after.borrow_mut().push("after".into());
            Ok(())
        });
        (app, log, capture)
    }

    fn logging_command(name: &str, log: &Log) -> Command {
        let log = log.clone();
        let label = name.to_string();
        Command::new(
            name,
            Handler::with_args(move |ctx, args| {
                log.borrow_mut()
                    .push(format!("{}:{}:{}", label, ctx.invoked_as(), args.join(",")));
                Ok(())
            }),
        )
    }

    #[test]
    fn run_without_commands_fails() {
        let mut app = Application::new("example");
        let err = app.run(Vec::<String>::new(), io::empty()).unwrap_err();
        assert!(matches!(err, DrydockError::NoCommandsDefined));
    }

    #[test]
    fn hooks_wrap_handler() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("task", &log));
        app.run(["task", "a"], io::empty()).unwrap();
        assert_eq!(*log.borrow(), vec!["before", "task:task:a", "after"]);
    }

    #[test]
    fn second_run_is_noop() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("task", &log));
        app.run(["task"], io::empty()).unwrap();
        app.run(["task"], io::empty()).unwrap();
        assert_eq!(log.borrow().len(), 3);
        assert!(app.has_run());
    }

    #[test]
    fn handler_error_skips_after_hook() {
        let (mut app, log, _) = app_with_log();
        app.command(Command::new(
            "fail",
            Handler::bare(|| anyhow::bail!("handler failed")),
        ));
        let err = app.run(["fail"], io::empty()).unwrap_err();
        assert!(matches!(err, DrydockError::Hook(_)));
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[derive(Debug)]
    struct HookDown;

    impl std::fmt::Display for HookDown {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "hook down")
        }
    }

    impl std::error::Error for HookDown {}

    fn assert_hook_down(err: DrydockError) {
        match err {
            DrydockError::Hook(inner) => assert!(inner.downcast_ref::<HookDown>().is_some()),
            other => panic!("expected Hook, got {other:?}"),
        }
    }

    #[test]
    fn stdin_hook_runs_before_before_hook() {
        let (mut app, log, _) = app_with_log();
        let inner = log.clone();
        app.stdin(move |source| {
            inner.borrow_mut().push("stdin".into());
            Ok(StdinPayload::Stream(source))
        });
        app.command(logging_command("task", &log));

        app.run(["task"], io::empty()).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["stdin", "before", "task:task:", "after"]
        );
    }

    #[test]
    fn before_hook_error_skips_handler_and_after() {
        let (mut app, log, _) = app_with_log();
        app.before(|| Err(HookDown.into()));
        app.command(logging_command("task", &log));

        let err = app.run(["task"], io::empty()).unwrap_err();
        assert_hook_down(err);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn stdin_hook_error_skips_everything_after_it() {
        let (mut app, log, _) = app_with_log();
        app.stdin(|_| Err(HookDown.into()));
        app.command(logging_command("task", &log));

        let err = app.run(["task"], io::empty()).unwrap_err();
        assert_hook_down(err);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn parse_error_skips_hooks() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("task", &log));
        let err = app.run(["task", "--nope"], io::empty()).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn alias_reports_invoked_name() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("build", &log));
        assert!(app.alias_command("b", "build"));
        app.run(["b"], io::empty()).unwrap();
        assert_eq!(log.borrow()[1], "build:b:");
    }

    #[test]
    fn command_alias_takes_target_first() {
        let (mut app, _, _) = app_with_log();
        app.command(Command::new("build", Handler::noop()));
        assert!(app.command_alias("build", "mk"));
        assert_eq!(app.resolve("mk").unwrap().name().as_str(), "build");
    }

    #[test]
    fn default_handler_declares_and_selects() {
        let (mut app, log, _) = app_with_log();
        let inner = log.clone();
        app.default_handler(Handler::context(move |ctx| {
            inner.borrow_mut().push(ctx.name().to_string());
            Ok(())
        }));
        app.run(Vec::<String>::new(), io::empty()).unwrap();
        assert!(app.is_command("default"));
        assert_eq!(log.borrow()[1], "default");
    }

    #[test]
    fn default_command_points_at_declared() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("status", &log));
        app.default_command("status");
        app.run(Vec::<String>::new(), io::empty()).unwrap();
        assert_eq!(log.borrow()[1], "status:status:");
    }

    #[test]
    fn default_to_undeclared_command_is_unknown() {
        let (mut app, _, _) = app_with_log();
        app.command(Command::new("status", Handler::noop()));
        app.default_command("missing");
        let err = app.run(Vec::<String>::new(), io::empty()).unwrap_err();
        assert!(matches!(err, DrydockError::UnknownCommand { ref name } if name == "missing"));
    }

    #[test]
    fn stdin_hook_feeds_handler() {
        let (mut app, log, _) = app_with_log();
        app.stdin(|mut source| {
            let mut text = String::new();
            source.read_to_string(&mut text)?;
            Ok(StdinPayload::Lines(text.lines().map(str::to_string).collect()))
        });
        let inner = log.clone();
        app.command(Command::new(
            "count",
            Handler::full(move |_, _, stdin| {
                let lines = stdin.lines()?;
                inner.borrow_mut().push(lines.len().to_string());
                Ok(())
            }),
        ));
        app.run(["count"], io::Cursor::new("a\nb\nc\n")).unwrap();
        assert_eq!(log.borrow()[1], "3");
    }

    #[test]
    fn option_declared_after_command() {
        let (mut app, _, capture) = app_with_log();
        app.command(Command::new(
            "show",
            Handler::context(|ctx| {
                let format = ctx.options().str("format").unwrap_or("-").to_string();
                writeln!(ctx.out(), "{}", format)?;
                Ok(())
            }),
        ));
        assert_eq!(
            app.option("show", OptionSpec::new('f', "format").value(crate::ValueType::String)),
            Some("format".to_string())
        );
        assert!(app.option("missing", OptionSpec::short('x')).is_none());
        app.run(["show", "-f", "json"], io::empty()).unwrap();
        assert_eq!(capture.contents(), "json\n");
    }

    #[test]
    fn declare_by_scope() {
        let mut app = Application::new("example");
        app.command(Command::new("task", Handler::noop()));
        assert_eq!(
            app.declare(&Scope::Global, OptionSpec::new('v', "verbose")),
            Some("verbose".to_string())
        );
        assert_eq!(
            app.declare(&Scope::command("task"), OptionSpec::short('x')),
            Some("x".to_string())
        );
        assert!(app.declare(&Scope::command("nope"), OptionSpec::short('x')).is_none());
        assert_eq!(app.option_parser(&Scope::Global).unwrap().specs().len(), 1);
        assert_eq!(
            app.option_parser(&Scope::command("task")).unwrap().specs().len(),
            1
        );
    }

    #[test]
    fn ignore_options_after_declaration() {
        let (mut app, log, _) = app_with_log();
        app.command(logging_command("raw", &log));
        assert!(app.ignore_options("raw"));
        app.run(["raw", "--anything", "-x"], io::empty()).unwrap();
        assert_eq!(log.borrow()[1], "raw:raw:--anything,-x");
    }

    #[test]
    fn help_goes_to_output_and_skips_hooks() {
        let (mut app, log, capture) = app_with_log();
        app.global_usage("example [-v] COMMAND");
        app.command(logging_command("task", &log));
        app.describe("task", "Do the task");
        app.run(["--help"], io::empty()).unwrap();

        let text = capture.contents();
        assert!(text.contains("example [-v] COMMAND"));
        assert!(text.contains("Do the task"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn command_usage_banner_in_help() {
        let (mut app, _, capture) = app_with_log();
        app.command(Command::new("task", Handler::noop()));
        assert!(app.usage("task", "example task [--fast]"));
        app.run(["task", "--help"], io::empty()).unwrap();
        assert!(capture.contents().contains("example task [--fast]"));
    }

    #[test]
    fn invalid_declaration_is_reported_at_run() {
        let mut app = Application::new("example");
        app.global_option(OptionSpec::long(""));
        app.command(Command::new("task", Handler::noop()));
        let err = app.run(["task"], io::empty()).unwrap_err();
        assert!(matches!(err, DrydockError::InvalidDeclaration { .. }));
    }

    #[test]
    fn debug_toggles() {
        let mut app = Application::new("example");
        assert!(!app.is_debug());
        app.debug(DebugToggle::Toggle);
        assert!(app.is_debug());
        app.debug(DebugToggle::Off);
        assert!(!app.is_debug());
    }

    #[test]
    fn consume_by_scope() {
        let mut app = Application::new("example");
        app.global_option(OptionSpec::new('v', "verbose"));
        app.command(
            Command::new("task", Handler::noop())
                .option(OptionSpec::long("level").value(crate::ValueType::Integer)),
        );

        let mut argv: Vec<String> = vec!["-v".into(), "x".into()];
        let values = app.consume(&Scope::Global, &mut argv).unwrap();
        assert!(values.flag("verbose"));
        assert_eq!(argv, vec!["x"]);

        let mut argv: Vec<String> = vec!["--level".into()];
        let err = app.consume(&Scope::command("task"), &mut argv).unwrap_err();
        assert!(matches!(err, DrydockError::MissingArgument { .. }));

        let err = app
            .consume(&Scope::command("missing"), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, DrydockError::UnknownCommand { .. }));
    }

    #[test]
    fn consume_ignored_command_scope() {
        let mut app = Application::new("example");
        app.command(Command::new("task", Handler::noop()).ignore_options());

        let mut argv: Vec<String> = vec!["-x".into(), "weird".into()];
        let values = app.consume(&Scope::command("task"), &mut argv).unwrap();
        assert!(values.is_empty());
        assert_eq!(argv, vec!["-x", "weird"]);
    }

    #[test]
    fn command_names_in_declaration_order() {
        let mut app = Application::new("example");
        app.command(Command::new("zeta", Handler::noop()));
        app.command(Command::new("alpha_beta", Handler::noop()));
        app.alias_command("z", "zeta");
        assert_eq!(app.command_names(), vec!["zeta", "alpha-beta"]);
    }
}
