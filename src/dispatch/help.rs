//! Usage banners and help text for the global scope and for commands.

use crate::command::{Command, CommandRegistry};
use crate::options::HelpSections;

/// Help for `<program> --help`: the global banner plus the command list.
pub fn global_sections(
    program: &str,
    banner: Option<&str>,
    registry: &CommandRegistry,
) -> HelpSections {
    let usage = banner.map(str::to_string).unwrap_or_else(|| {
        format!(
            "{} [global options] COMMAND [command options] [args]",
            program
        )
    });
    HelpSections {
        usage,
        about: None,
        after: command_list(registry),
    }
}

/// Help for `<program> <command> --help`.
pub fn command_sections(program: &str, command: &Command) -> HelpSections {
    let usage = command
        .parser()
        .banner()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} {}", program, command.name().display_name()));
    HelpSections {
        usage,
        about: command.get_description().map(str::to_string),
        after: None,
    }
}

/// "Commands:" block listing display names and descriptions in declaration
/// order, with a `(default)` marker.
pub fn command_list(registry: &CommandRegistry) -> Option<String> {
    if registry.is_empty() {
        return None;
    }

    let default = registry.default_name();
    let rows: Vec<(String, String)> = registry
        .iter()
        .map(|cmd| {
            let mut desc = cmd.get_description().unwrap_or_default().to_string();
            if default == Some(cmd.name()) {
                if desc.is_empty() {
                    desc.push_str("(default)");
                } else {
                    desc.push_str(" (default)");
                }
            }
            (cmd.name().display_name(), desc)
        })
        .collect();

    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::from("Commands:");
    for (name, desc) in rows {
        out.push_str("\n  ");
        if desc.is_empty() {
            out.push_str(&name);
        } else {
            out.push_str(&format!("{:<width$}  {}", name, desc, width = width));
        }
    }
    Some(out)
}
