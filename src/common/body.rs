use std::{
    fmt,
    io::{self, Cursor, Read},
};

use bytes::Bytes;

/// A single-use request body stream.
///
/// A `Body` can be read exactly once. Dropping it closes the underlying source, so code that
/// needs the content more than once has to capture the bytes and install a fresh `Body`
/// in place of the consumed one (see [`crate::server::matchers::rewind`]).
pub struct Body {
    source: Box<dyn Read + Send>,
}

impl Body {
    /// Creates a body that streams from the given reader.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            source: Box::new(reader),
        }
    }

    /// Creates a body without any content.
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::from_reader(Cursor::new(value))
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Self::from(Bytes::from_static(value.as_bytes()))
    }
}
