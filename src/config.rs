//! Runtime settings.
//!
//! Settings come from the process (program name from argv[0]) and from
//! environment variables, and can be changed by the declaring program.

use std::collections::HashMap;
use std::path::Path;

/// Environment variable that turns on debug output.
pub const DEBUG_ENV: &str = "DRYDOCK_DEBUG";

/// How a call to `debug` changes the debug flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugToggle {
    On,
    Off,
    /// Flip the current value.
    Toggle,
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Name shown in usage lines.
    pub program_name: String,
    /// Print error source chains on failure.
    pub debug: bool,
}

impl Settings {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
            debug: false,
        }
    }

    /// Settings for the running process.
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k == DEBUG_ENV)
            .collect();
        let program = std::env::args_os()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "drydock".to_string());
        Self::with_overrides(program, &vars)
    }

    /// Settings with explicit environment overrides (for testing).
    pub fn with_overrides(program_name: impl Into<String>, vars: &HashMap<String, String>) -> Self {
        let mut settings = Self::new(program_name);
        if let Some(value) = vars.get(DEBUG_ENV) {
            settings.debug = is_truthy(value);
        }
        settings
    }

    pub fn apply(&mut self, toggle: DebugToggle) {
        self.debug = match toggle {
            DebugToggle::On => true,
            DebugToggle::Off => false,
            DebugToggle::Toggle => !self.debug,
        };
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new("drydock")
    }
}

/// Interpret an environment value as a boolean.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
