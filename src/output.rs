//! Output sinks.
//!
//! Handlers, lifecycle methods, and help rendering write through an
//! [`Output`] instead of the process's stdout, so output can be captured by
//! supplying a [`CaptureBuffer`].
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use drydock::output::CaptureBuffer;
//!
//! let capture = CaptureBuffer::new();
//! let mut sink = capture.sink();
//! writeln!(sink, "hello").unwrap();
//!
//! assert_eq!(capture.contents(), "hello\n");
//! ```

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use console::Term;

/// Boxed output sink.
pub type Output = Box<dyn Write>;

/// Sink writing to the terminal's stdout.
pub fn terminal() -> Output {
    Box::new(Term::stdout())
}

/// Shared in-memory sink for capturing output in tests.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed sink writing into this buffer.
    pub fn sink(&self) -> Output {
        Box::new(self.clone())
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Captured lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let capture = CaptureBuffer::new();
        let mut writer = capture.clone();
        write!(writer, "a").unwrap();
        write!(capture.sink(), "b").unwrap();
        assert_eq!(capture.contents(), "ab");
    }

    #[test]
    fn lines_and_clear() {
        let capture = CaptureBuffer::new();
        writeln!(capture.sink(), "one\ntwo").unwrap();
        assert_eq!(capture.lines(), vec!["one", "two"]);
        capture.clear();
        assert!(capture.is_empty());
    }
}
