//! Option declaration and parsing.
//!
//! - [`spec`] - Declarative description of one flag
//! - [`values`] - Resolved values for one scope
//! - [`parser`] - Per-scope parser translating specs into a runtime parser
//!
//! Global and command scopes use the same [`OptionParser`]; only the specs
//! differ.

pub mod parser;
pub mod spec;
pub mod values;

pub use parser::{HelpSections, OptionParser, ParseOutcome};
pub use spec::{OptionSpec, OptionValue, Transform, ValueKind, ValueType};
pub use values::OptionValues;
