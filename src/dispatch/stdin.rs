//! Standard input payload handed to command handlers.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read};

/// What a handler receives as its stdin argument.
///
/// Without a stdin hook this is the raw [`StdinPayload::Stream`]. A stdin hook
/// may pre-read it into text or lines.
pub enum StdinPayload {
    /// Unread byte source.
    Stream(Box<dyn Read>),
    /// Pre-read text.
    Text(String),
    /// Pre-read lines, without line terminators.
    Lines(Vec<String>),
}

impl StdinPayload {
    /// A stream with nothing in it.
    pub fn empty() -> Self {
        Self::Stream(Box::new(io::empty()))
    }

    /// Wrap a reader.
    pub fn from_reader(reader: impl Read + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// Consume the payload as one string.
    pub fn read_to_string(self) -> io::Result<String> {
        match self {
            Self::Stream(mut reader) => {
                let mut buf = String::new();
                reader.read_to_string(&mut buf)?;
                Ok(buf)
            }
            Self::Text(text) => Ok(text),
            Self::Lines(lines) => Ok(lines.join("\n")),
        }
    }

    /// Consume the payload as lines.
    pub fn lines(self) -> io::Result<Vec<String>> {
        match self {
            Self::Stream(reader) => BufReader::new(reader).lines().collect(),
            Self::Text(text) => Ok(text.lines().map(str::to_string).collect()),
            Self::Lines(lines) => Ok(lines),
        }
    }
}

impl Default for StdinPayload {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for StdinPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Lines(lines) => f.debug_tuple("Lines").field(lines).finish(),
        }
    }
}
