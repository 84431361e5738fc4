//! Argument segmentation.
//!
//! Splits a raw argument vector into global options, a command, command
//! options, and positional arguments:
//!
//! 1. The global parser reads flags from the front of `argv` up to the first
//!    token that is not a flag or a flag's value. That token is the command;
//!    when there is none the default command is used.
//! 2. The command is resolved through the registry.
//! 3. Unless the command ignores options, the rest of `argv` is parsed with
//!    the command's specs plus the global specs that do not collide with
//!    them, so global flags may also follow the command. Whatever is not a
//!    flag becomes a positional argument, in order.
//!
//! An unknown flag before the command, or anywhere in the tail of a parsed
//! command, is an error.

use crate::command::CommandRegistry;
use crate::error::{DrydockError, Result};
use crate::options::parser::GlobalSplit;
use crate::options::{OptionParser, OptionValues, ParseOutcome};

use super::help;

/// The parts of a segmented argument vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Resolved global options, wherever they appeared.
    pub globals: OptionValues,
    /// The name used to pick the command (as typed, or the default).
    pub command: String,
    /// Resolved command-specific options.
    pub options: OptionValues,
    /// Remaining positional arguments.
    pub args: Vec<String>,
}

/// Splits argv using the global parser and the command registry.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentSegmenter<'a> {
    program: &'a str,
    global: &'a OptionParser,
    registry: &'a CommandRegistry,
}

impl<'a> ArgumentSegmenter<'a> {
    pub fn new(program: &'a str, global: &'a OptionParser, registry: &'a CommandRegistry) -> Self {
        Self {
            program,
            global,
            registry,
        }
    }

    /// Segment `argv`.
    ///
    /// # Errors
    ///
    /// - `UnknownCommand` when the command token (or the default) does not
    ///   resolve
    /// - `InvalidArgument` / `MissingArgument` for flag errors
    pub fn segment(&self, argv: Vec<String>) -> Result<ParseOutcome<Segmentation>> {
        let global_help = help::global_sections(self.program, self.global.banner(), self.registry);
        let GlobalSplit {
            values: mut globals,
            command,
            rest,
        } = match self.global.split_command(argv, Some(&global_help))? {
            ParseOutcome::Parsed(split) => split,
            ParseOutcome::Help(text) => return Ok(ParseOutcome::Help(text)),
        };

        let invoked = match command {
            Some(token) => token,
            None => match self.registry.default_name() {
                Some(name) => name.as_str().to_string(),
                None => return Err(DrydockError::unknown_command(None)),
            },
        };
        let cmd = self
            .registry
            .resolve(&invoked)
            .ok_or_else(|| DrydockError::unknown_command(Some(&invoked)))?;

        tracing::debug!(
            "segmented: command={} globals={:?} tail={:?}",
            invoked,
            globals,
            rest
        );

        if cmd.parser().is_ignored() {
            tracing::trace!("'{}' ignores options; passing arguments through", invoked);
            return Ok(ParseOutcome::Parsed(Segmentation {
                globals,
                command: invoked,
                options: OptionValues::new(),
                args: rest,
            }));
        }

        if rest.is_empty() {
            return Ok(ParseOutcome::Parsed(Segmentation {
                globals,
                command: invoked,
                options: OptionValues::new(),
                args: rest,
            }));
        }

        let inherited = self.global.active_specs();
        let command_help = help::command_sections(self.program, cmd);
        let tail = match cmd
            .parser()
            .parse_tail(&inherited, rest, Some(&command_help))?
        {
            ParseOutcome::Parsed(tail) => tail,
            ParseOutcome::Help(text) => return Ok(ParseOutcome::Help(text)),
        };

        globals.merge(tail.inherited);
        Ok(ParseOutcome::Parsed(Segmentation {
            globals,
            command: invoked,
            options: tail.own,
            args: tail.rest,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, Handler};
    use crate::options::{OptionSpec, OptionValue, ValueType};

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (OptionParser, CommandRegistry) {
        let mut global = OptionParser::new();
        global.declare(OptionSpec::new('v', "verbose"));
        global.declare(OptionSpec::long("level").value(ValueType::String));

        let mut registry = CommandRegistry::new();
        registry.register(
            Command::new("deploy", Handler::noop())
                .description("Deploy the app")
                .option(OptionSpec::new('t', "target").value(ValueType::String)),
        );
        registry.register(Command::new("task", Handler::noop()).ignore_options());
        registry.register(Command::new("show-all", Handler::noop()));
        (global, registry)
    }

    fn segment(tokens: &[&str]) -> Result<Segmentation> {
        let (global, registry) = fixture();
        let segmenter = ArgumentSegmenter::new("example", &global, &registry);
        match segmenter.segment(argv(tokens))? {
            ParseOutcome::Parsed(seg) => Ok(seg),
            ParseOutcome::Help(text) => panic!("unexpected help:\n{text}"),
        }
    }

    #[test]
    fn splits_global_command_and_options() {
        let seg = segment(&["--verbose", "deploy", "--target=prod"]).unwrap();
        assert_eq!(seg.globals.get("verbose"), Some(&OptionValue::Bool(true)));
        assert_eq!(seg.globals.len(), 1);
        assert_eq!(seg.command, "deploy");
        assert_eq!(seg.options.str("target"), Some("prod"));
        assert!(seg.args.is_empty());
    }

    #[test]
    fn global_flag_after_command_is_tolerated() {
        let seg = segment(&["deploy", "-t", "prod", "--verbose", "extra"]).unwrap();
        assert!(seg.globals.flag("verbose"));
        assert_eq!(seg.options.str("target"), Some("prod"));
        assert_eq!(seg.args, argv(&["extra"]));
    }

    #[test]
    fn ignored_command_gets_arguments_verbatim() {
        let seg = segment(&["task", "-x", "weird"]).unwrap();
        assert_eq!(seg.command, "task");
        assert_eq!(seg.args, argv(&["-x", "weird"]));
        assert!(seg.options.is_empty());
    }

    #[test]
    fn ignored_command_keeps_global_lookalikes() {
        let seg = segment(&["task", "--verbose"]).unwrap();
        assert!(!seg.globals.flag("verbose"));
        assert_eq!(seg.args, argv(&["--verbose"]));
    }

    #[test]
    fn hyphenated_token_resolves_canonical_command() {
        let seg = segment(&["show-all"]).unwrap();
        assert_eq!(seg.command, "show-all");
    }

    #[test]
    fn empty_argv_uses_default() {
        let (global, mut registry) = fixture();
        registry.set_default("deploy");
        let segmenter = ArgumentSegmenter::new("example", &global, &registry);
        let outcome = segmenter.segment(Vec::new()).unwrap();
        let ParseOutcome::Parsed(seg) = outcome else {
            panic!("unexpected help");
        };
        assert_eq!(seg.command, "deploy");
    }

    #[test]
    fn empty_argv_without_default_is_unknown_command() {
        let err = segment(&[]).unwrap_err();
        assert!(matches!(err, DrydockError::UnknownCommand { ref name } if name == "unknown"));
    }

    #[test]
    fn unknown_command_carries_name() {
        let err = segment(&["bogus"]).unwrap_err();
        assert!(matches!(err, DrydockError::UnknownCommand { ref name } if name == "bogus"));
    }

    #[test]
    fn unknown_flag_before_command_is_invalid_argument() {
        let err = segment(&["--target=prod", "deploy"]).unwrap_err();
        match err {
            DrydockError::InvalidArgument { args } => assert_eq!(args, vec!["--target"]),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn unknown_flag_after_command_is_invalid_argument() {
        let err = segment(&["deploy", "-x"]).unwrap_err();
        assert!(matches!(err, DrydockError::InvalidArgument { .. }));
    }

    #[test]
    fn trailing_typed_global_is_missing_argument() {
        let err = segment(&["--level"]).unwrap_err();
        match err {
            DrydockError::MissingArgument { args } => assert_eq!(args, vec!["--level"]),
            other => panic!("expected MissingArgument, got {other:?}"),
        }
    }

    #[test]
    fn global_help_lists_commands() {
        let (global, registry) = fixture();
        let segmenter = ArgumentSegmenter::new("example", &global, &registry);
        match segmenter.segment(argv(&["--help"])).unwrap() {
            ParseOutcome::Help(text) => {
                assert!(text.contains("deploy"));
                assert!(text.contains("show-all"));
                assert!(text.contains("--verbose"));
            }
            ParseOutcome::Parsed(_) => panic!("expected help"),
        }
    }

    #[test]
    fn command_help_shows_command_options() {
        let (global, registry) = fixture();
        let segmenter = ArgumentSegmenter::new("example", &global, &registry);
        match segmenter.segment(argv(&["deploy", "--help"])).unwrap() {
            ParseOutcome::Help(text) => {
                assert!(text.contains("example deploy"));
                assert!(text.contains("--target"));
                assert!(text.contains("Deploy the app"));
            }
            ParseOutcome::Parsed(_) => panic!("expected help"),
        }
    }
}
