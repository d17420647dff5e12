use std::{io::Read, mem};

use bytes::Bytes;

use crate::{common::body::Body, server::matchers::schema::Error};

/// Captures a request body and puts an equivalent, unread body back when it goes out of scope.
///
/// The original stream is read to the end and closed when the guard is created. Whatever was
/// read, even if the read failed half way, is reinstalled from position zero when the guard is
/// dropped. This happens on every exit path, unwinding included.
pub(crate) struct RewindGuard<'a> {
    slot: &'a mut Body,
    captured: Vec<u8>,
    read_error: Option<String>,
}

impl<'a> RewindGuard<'a> {
    pub(crate) fn capture(slot: &'a mut Body) -> Self {
        let mut original = mem::take(slot);
        let mut guard = Self {
            slot,
            captured: Vec::new(),
            read_error: None,
        };

        if let Err(err) = original.read_to_end(&mut guard.captured) {
            guard.read_error = Some(err.to_string());
        }
        drop(original);

        guard
    }

    /// The captured body content. Fails if the original stream could not be read completely.
    pub(crate) fn bytes(&self) -> Result<&[u8], Error> {
        match &self.read_error {
            Some(err) => Err(Error::BodyReadError(err.clone())),
            None => Ok(&self.captured),
        }
    }
}

impl Drop for RewindGuard<'_> {
    fn drop(&mut self) {
        let captured = Bytes::from(mem::take(&mut self.captured));
        *self.slot = Body::from(captured);
    }
}
