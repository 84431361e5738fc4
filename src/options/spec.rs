//! Declarative option specifications.
//!
//! An [`OptionSpec`] describes one flag: its short and long names, whether it
//! takes a value, its help text, and an optional transform applied to the
//! parsed value.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{DrydockError, Result};

/// A parsed option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Presence of a boolean flag, or a transformed boolean.
    Bool(bool),
    /// Raw string value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Comma-separated list value.
    List(Vec<String>),
}

impl OptionValue {
    /// Get as bool if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string slice if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as list if this is a `List`.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Str(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::List(v) => write!(f, "{}", v.join(",")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// The type a value-taking option converts its raw token into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Keep the raw string.
    #[default]
    String,
    /// Parse as a signed integer.
    Integer,
    /// Parse as a float.
    Float,
    /// Split on commas.
    List,
}

impl ValueType {
    /// Convert a raw token into a value of this type.
    pub fn convert(&self, raw: &str) -> std::result::Result<OptionValue, String> {
        match self {
            Self::String => Ok(OptionValue::Str(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|e| format!("invalid integer '{}': {}", raw, e)),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .map(OptionValue::Float)
                .map_err(|e| format!("invalid number '{}': {}", raw, e)),
            Self::List => Ok(OptionValue::List(
                raw.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::String => "VALUE",
            Self::Integer => "N",
            Self::Float => "NUM",
            Self::List => "X,Y,Z",
        }
    }
}

/// Whether an option is a boolean switch or consumes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Presence means `true`; no token is consumed.
    #[default]
    Boolean,
    /// Consumes the next token (or the `=value` form).
    Value(ValueType),
}

/// Post-processing applied to a converted option value.
pub type Transform =
    Arc<dyn Fn(OptionValue) -> std::result::Result<OptionValue, String> + Send + Sync>;

/// Declarative description of one flag.
///
/// Every constructor sets at least one name, so a spec always has a key.
///
/// # Example
///
/// ```
/// use drydock::options::{OptionSpec, OptionValue, ValueType};
///
/// let spec = OptionSpec::new('m', "max")
///     .value(ValueType::Integer)
///     .help("Maximum threshold")
///     .transform(|v| match v {
///         OptionValue::Int(n) if n > 100 => Ok(OptionValue::Int(100)),
///         other => Ok(other),
///     });
///
/// assert_eq!(spec.key(), "max");
/// assert_eq!(spec.resolve(Some("250")).unwrap(), OptionValue::Int(100));
/// ```
#[derive(Clone)]
pub struct OptionSpec {
    short: Option<char>,
    long: Option<String>,
    kind: ValueKind,
    description: String,
    transform: Option<Transform>,
}

impl OptionSpec {
    /// Create a boolean spec with both a short and a long name.
    pub fn new(short: char, long: impl Into<String>) -> Self {
        Self {
            short: Some(short),
            long: Some(normalize_long(long.into())),
            kind: ValueKind::Boolean,
            description: String::new(),
            transform: None,
        }
    }

    /// Create a boolean spec with only a short name.
    pub fn short(short: char) -> Self {
        Self {
            short: Some(short),
            long: None,
            kind: ValueKind::Boolean,
            description: String::new(),
            transform: None,
        }
    }

    /// Create a boolean spec with only a long name.
    pub fn long(long: impl Into<String>) -> Self {
        Self {
            short: None,
            long: Some(normalize_long(long.into())),
            kind: ValueKind::Boolean,
            description: String::new(),
            transform: None,
        }
    }

    /// Make this option consume a value of the given type.
    pub fn value(mut self, ty: ValueType) -> Self {
        self.kind = ValueKind::Value(ty);
        self
    }

    /// Set the help text.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set a transform applied after type conversion.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(OptionValue) -> std::result::Result<OptionValue, String> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the option consumes a value token.
    pub fn takes_value(&self) -> bool {
        matches!(self.kind, ValueKind::Value(_))
    }

    /// The name under which the parsed value is stored.
    ///
    /// The longer of the short and long names wins; on a tie the short name
    /// is kept.
    pub fn key(&self) -> String {
        match (self.short, self.long.as_deref()) {
            (Some(s), Some(l)) if l.chars().count() <= 1 => s.to_string(),
            (_, Some(l)) => l.to_string(),
            (Some(s), None) => s.to_string(),
            (None, None) => String::new(),
        }
    }

    /// The flag as a user would type it, preferring the long form.
    pub fn flag(&self) -> String {
        match (self.short, self.long.as_deref()) {
            (_, Some(l)) => format!("--{}", l),
            (Some(s), None) => format!("-{}", s),
            (None, None) => String::new(),
        }
    }

    pub(crate) fn value_name(&self) -> String {
        match self.kind {
            ValueKind::Value(ValueType::String) => self.key().to_uppercase().replace('-', "_"),
            ValueKind::Value(ty) => ty.placeholder().to_string(),
            ValueKind::Boolean => String::new(),
        }
    }

    /// Check that the spec can be turned into a parser argument.
    pub fn validate(&self) -> Result<()> {
        if self.short.is_none() && self.long.as_deref().is_none_or(str::is_empty) {
            return Err(DrydockError::InvalidDeclaration {
                message: "an option needs a short or a long name".to_string(),
            });
        }
        if let Some(s) = self.short {
            if s == '-' || s == '=' || s.is_whitespace() || s.is_control() {
                return Err(DrydockError::InvalidDeclaration {
                    message: format!("'{}' cannot be used as a short option name", s),
                });
            }
        }
        if let Some(l) = self.long.as_deref() {
            if l.is_empty() && self.short.is_some() {
                return Err(DrydockError::InvalidDeclaration {
                    message: format!("empty long name for option -{}", self.key()),
                });
            }
            if l.chars().any(|c| c == '=' || c.is_whitespace()) {
                return Err(DrydockError::InvalidDeclaration {
                    message: format!("'{}' cannot be used as a long option name", l),
                });
            }
        }
        Ok(())
    }

    /// Turn the raw token (or presence, for switches) into the final value.
    ///
    /// Conversion and transform failures are reported as `InvalidArgument`
    /// carrying the flag and the raw value.
    pub fn resolve(&self, raw: Option<&str>) -> Result<OptionValue> {
        let converted = match (self.kind, raw) {
            (ValueKind::Boolean, _) => Ok(OptionValue::Bool(true)),
            (ValueKind::Value(ty), Some(raw)) => ty.convert(raw),
            (ValueKind::Value(_), None) => {
                return Err(DrydockError::MissingArgument {
                    args: vec![self.flag()],
                })
            }
        };
        let value = match (converted, &self.transform) {
            (Ok(v), Some(t)) => t(v),
            (other, _) => other,
        };
        value.map_err(|reason| {
            tracing::debug!("rejected value for {}: {}", self.flag(), reason);
            let mut args = vec![self.flag()];
            args.extend(raw.map(str::to_string));
            DrydockError::InvalidArgument { args }
        })
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

fn normalize_long(long: String) -> String {
    long.trim_start_matches('-').to_string()
}
