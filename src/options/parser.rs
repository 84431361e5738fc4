//! Per-scope option parsing.
//!
//! An [`OptionParser`] accumulates [`OptionSpec`]s for one scope (the global
//! scope or one command) and translates them into a runtime parser. The
//! parsing itself is delegated to clap; its errors are re-wrapped into
//! [`DrydockError::InvalidArgument`] and [`DrydockError::MissingArgument`]
//! so the error surface does not depend on the backend.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches};

use crate::error::{DrydockError, Result};

use super::spec::OptionSpec;
use super::values::OptionValues;

/// Id of the catch-all positional argument. Contains a space so it can never
/// collide with an option key.
const POSITIONAL_ID: &str = "drydock positional";

/// Result of a parse that may instead have asked for help.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// Arguments were parsed.
    Parsed(T),
    /// `-h`/`--help` was given; carries the rendered help text.
    Help(String),
}

/// Text blocks rendered around the option list when help is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpSections {
    pub usage: String,
    pub about: Option<String>,
    pub after: Option<String>,
}

/// Global options plus the command token and its raw arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GlobalSplit {
    pub values: OptionValues,
    pub command: Option<String>,
    pub rest: Vec<String>,
}

/// Values from a command tail: the scope's own options, the inherited
/// (global) options that appeared after the command, and what was left.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TailValues {
    pub own: OptionValues,
    pub inherited: OptionValues,
    pub rest: Vec<String>,
}

/// Option specs for one scope.
#[derive(Debug, Clone, Default)]
pub struct OptionParser {
    specs: Vec<OptionSpec>,
    ignored: bool,
    banner: Option<String>,
}

impl OptionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec and return the key its value will be stored under.
    pub fn declare(&mut self, spec: OptionSpec) -> String {
        let key = spec.key();
        self.specs.push(spec);
        key
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether arguments for this scope are handed over untouched.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Stop parsing arguments for this scope.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn set_banner(&mut self, banner: impl Into<String>) {
        self.banner = Some(banner.into());
    }

    /// Check every declared spec.
    pub fn validate(&self) -> Result<()> {
        self.specs.iter().try_for_each(OptionSpec::validate)
    }

    /// Parse `argv`, removing every recognized flag (and its value) and
    /// leaving the other tokens in order. An ignored scope leaves `argv`
    /// untouched and yields no values.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a token that looks like a flag but matches no
    /// spec, `MissingArgument` for a value-taking flag with nothing after it.
    ///
    /// # Example
    ///
    /// ```
    /// use drydock::options::{OptionParser, OptionSpec, ValueType};
    ///
    /// let mut parser = OptionParser::new();
    /// parser.declare(OptionSpec::new('f', "format").value(ValueType::String));
    ///
    /// let mut argv = vec!["a".to_string(), "-f".to_string(), "yaml".to_string(), "b".to_string()];
    /// let values = parser.consume(&mut argv).unwrap();
    ///
    /// assert_eq!(values.str("format"), Some("yaml"));
    /// assert_eq!(argv, vec!["a", "b"]);
    /// ```
    pub fn consume(&self, argv: &mut Vec<String>) -> Result<OptionValues> {
        if self.ignored {
            return Ok(OptionValues::new());
        }
        self.validate()?;
        match self.parse_tail(&[], argv.clone(), None)? {
            ParseOutcome::Parsed(tail) => {
                *argv = tail.rest;
                Ok(tail.own)
            }
            ParseOutcome::Help(_) => Err(DrydockError::InvalidArgument {
                args: vec!["--help".to_string()],
            }),
        }
    }

    /// Specs that take part in parsing. When two specs share a key or a name,
    /// the later declaration wins.
    pub(crate) fn active_specs(&self) -> Vec<&OptionSpec> {
        let mut kept: Vec<&OptionSpec> = Vec::new();
        for spec in self.specs.iter().rev() {
            if !collides(spec, &kept) {
                kept.push(spec);
            }
        }
        kept.reverse();
        kept
    }

    /// Parse leading flags of `argv` up to the first non-flag token, which is
    /// taken as the command; everything after it is returned untouched.
    pub(crate) fn split_command(
        &self,
        argv: Vec<String>,
        help: Option<&HelpSections>,
    ) -> Result<ParseOutcome<GlobalSplit>> {
        let specs = self.active_specs();
        let cmd = runtime_parser(&specs, help)
            .allow_external_subcommands(true)
            .external_subcommand_value_parser(clap::value_parser!(String));

        let matches = match cmd.try_get_matches_from(argv) {
            Ok(m) => m,
            Err(e) => return translate(e).map(ParseOutcome::Help),
        };

        let values = collect(&matches, &specs)?;
        let (command, rest) = match matches.subcommand() {
            Some((name, sub)) => (Some(name.to_string()), external_args(sub)),
            None => (None, Vec::new()),
        };

        Ok(ParseOutcome::Parsed(GlobalSplit {
            values,
            command,
            rest,
        }))
    }

    /// Parse a command tail with this scope's specs plus `inherited` specs
    /// that do not collide with them. Flags and positionals may interleave.
    pub(crate) fn parse_tail(
        &self,
        inherited: &[&OptionSpec],
        argv: Vec<String>,
        help: Option<&HelpSections>,
    ) -> Result<ParseOutcome<TailValues>> {
        let own = self.active_specs();
        let inherited: Vec<&OptionSpec> = inherited
            .iter()
            .copied()
            .filter(|spec| !collides(spec, &own))
            .collect();

        let mut all = own.clone();
        all.extend(inherited.iter().copied());

        let cmd = runtime_parser(&all, help).arg(
            Arg::new(POSITIONAL_ID)
                .action(ArgAction::Append)
                .num_args(1..)
                .value_parser(clap::value_parser!(String))
                .hide(true),
        );

        let matches = match cmd.try_get_matches_from(argv) {
            Ok(m) => m,
            Err(e) => return translate(e).map(ParseOutcome::Help),
        };

        let rest = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();

        Ok(ParseOutcome::Parsed(TailValues {
            own: collect(&matches, &own)?,
            inherited: collect(&matches, &inherited)?,
            rest,
        }))
    }
}

fn collides(spec: &OptionSpec, others: &[&OptionSpec]) -> bool {
    let key = spec.key();
    others.iter().any(|other| {
        other.key() == key
            || (spec.short_name().is_some() && other.short_name() == spec.short_name())
            || (spec.long_name().is_some() && other.long_name() == spec.long_name())
    })
}

/// Translate specs into a clap command. Help is only wired in when
/// `help` is given and no spec claims `-h` or `--help`.
fn runtime_parser(specs: &[&OptionSpec], help: Option<&HelpSections>) -> clap::Command {
    let mut cmd = clap::Command::new("drydock")
        .no_binary_name(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .args_override_self(true);

    let help_claimed = specs.iter().any(|spec| {
        spec.short_name() == Some('h') || spec.long_name() == Some("help") || spec.key() == "help"
    });

    match help {
        Some(sections) if !help_claimed => {
            cmd = cmd.override_usage(sections.usage.clone());
            if let Some(about) = &sections.about {
                cmd = cmd.about(about.clone());
            }
            if let Some(after) = &sections.after {
                cmd = cmd.after_help(after.clone());
            }
        }
        _ => cmd = cmd.disable_help_flag(true),
    }

    for spec in specs {
        cmd = cmd.arg(to_arg(spec));
    }
    cmd
}

fn to_arg(spec: &OptionSpec) -> Arg {
    let mut arg = Arg::new(spec.key()).help(spec.description().to_string());
    if let Some(short) = spec.short_name() {
        arg = arg.short(short);
    }
    if let Some(long) = spec.long_name() {
        arg = arg.long(long.to_string());
    }
    if spec.takes_value() {
        arg.action(ArgAction::Set)
            .value_name(spec.value_name())
            .value_parser(clap::value_parser!(String))
            .allow_hyphen_values(true)
    } else {
        arg.action(ArgAction::SetTrue)
    }
}

fn collect(matches: &ArgMatches, specs: &[&OptionSpec]) -> Result<OptionValues> {
    let mut values = OptionValues::new();
    for spec in specs {
        let key = spec.key();
        let raw = if spec.takes_value() {
            match matches.get_one::<String>(&key) {
                Some(raw) => Some(raw.as_str()),
                None => continue,
            }
        } else {
            if !matches.get_flag(&key) {
                continue;
            }
            None
        };
        let value = spec.resolve(raw)?;
        values.set(key, value);
    }
    Ok(values)
}

fn external_args(sub: &ArgMatches) -> Vec<String> {
    sub.try_get_many::<String>("")
        .ok()
        .flatten()
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// Map a backend error onto the framework's error kinds. A help request is
/// returned as the rendered help text.
fn translate(err: clap::Error) -> Result<String> {
    match err.kind() {
        ErrorKind::DisplayHelp => Ok(err.render().to_string()),
        ErrorKind::InvalidValue => Err(DrydockError::MissingArgument {
            args: offending_args(&err),
        }),
        kind => {
            tracing::debug!("parser rejected arguments ({:?})", kind);
            Err(DrydockError::InvalidArgument {
                args: offending_args(&err),
            })
        }
    }
}

/// The flag names named by a backend error, without value placeholders
/// (`--level <LEVEL>` and `--level=x` become `--level`).
fn offending_args(err: &clap::Error) -> Vec<String> {
    let flag_only = |s: &String| {
        s.split_whitespace()
            .next()
            .unwrap_or(s)
            .split('=')
            .next()
            .unwrap_or_default()
            .trim_end_matches(',')
            .to_string()
    };
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(s)) => vec![flag_only(s)],
        Some(ContextValue::Strings(v)) => v.iter().map(flag_only).collect(),
        _ => Vec::new(),
    }
}
