//! Destinations for the text a command line produces.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// A shareable, growable text buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<String>>);

impl SharedBuffer {
    /// Returns a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the buffer's contents.
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the buffer's contents.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn push_str(&self, s: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(s);
    }
}

impl From<String> for SharedBuffer {
    fn from(s: String) -> Self {
        Self(Arc::new(Mutex::new(s)))
    }
}

/// Where output forwarded out of the interpreter ends up.
#[derive(Clone, Debug, Default)]
pub enum OutputSink {
    /// Output is discarded.
    #[default]
    Null,
    /// Output is written to the host process's standard output.
    Stdout,
    /// Output is written to the host process's standard error.
    Stderr,
    /// Output is accumulated in memory.
    Buffer(SharedBuffer),
}

impl OutputSink {
    /// Returns a sink backed by a new in-memory buffer.
    pub fn buffer() -> Self {
        Self::Buffer(SharedBuffer::new())
    }

    /// Writes text to the sink.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to write.
    pub fn write_str(&self, text: &str) -> Result<(), std::io::Error> {
        if text.is_empty() {
            return Ok(());
        }

        match self {
            Self::Null => Ok(()),
            Self::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
            Self::Stderr => {
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(text.as_bytes())?;
                stderr.flush()
            }
            Self::Buffer(buffer) => {
                buffer.push_str(text);
                Ok(())
            }
        }
    }

    /// Returns the accumulated text of a buffer sink; other sinks yield an empty string.
    pub fn contents(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.contents(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_clones_share_contents() -> Result<()> {
        let sink = OutputSink::buffer();
        let clone = sink.clone();
        sink.write_str("a")?;
        clone.write_str("b")?;
        assert_eq!(sink.contents(), "ab");

        if let OutputSink::Buffer(buffer) = &sink {
            assert_eq!(buffer.take(), "ab");
        }
        assert_eq!(clone.contents(), "");
        Ok(())
    }

    #[test]
    fn null_sink_discards() -> Result<()> {
        let sink = OutputSink::Null;
        sink.write_str("ignored")?;
        assert_eq!(sink.contents(), "");
        Ok(())
    }
}
