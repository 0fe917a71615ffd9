//! Request body size limits.
//!
//! Body fields are buffered before deserialization, so an unbounded body
//! can exhaust memory. The default cap is 4 MiB.

use std::io::Read;

use crate::error::{BodyError, Error};

/// Default maximum body size (4 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// Maximum number of body bytes a decode call will buffer.
///
/// ```rust
/// use reqbind::BodyLimits;
///
/// let limits = BodyLimits::default();
/// assert_eq!(limits.max_body_size(), Some(4 * 1024 * 1024));
///
/// let limits = BodyLimits::new(64 * 1024);
/// let limits = BodyLimits::unlimited();
/// assert_eq!(limits.max_body_size(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyLimits {
    /// `None` means unlimited.
    max_body_size: Option<usize>,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_body_size: Some(DEFAULT_MAX_BODY_SIZE),
        }
    }
}

impl BodyLimits {
    /// Caps bodies at `max_body_size` bytes.
    pub fn new(max_body_size: usize) -> Self {
        Self {
            max_body_size: Some(max_body_size),
        }
    }

    /// No cap at all. Only for trusted peers.
    pub fn unlimited() -> Self {
        Self {
            max_body_size: None,
        }
    }

    /// The cap in bytes, `None` when unlimited.
    pub fn max_body_size(&self) -> Option<usize> {
        self.max_body_size
    }

    /// Returns `Err` with a descriptive message when `size` exceeds the cap.
    pub fn check_size(&self, size: usize) -> Result<(), String> {
        match self.max_body_size {
            Some(max) if size > max => Err(format!(
                "body size {size} bytes exceeds maximum allowed size of {max} bytes"
            )),
            _ => Ok(()),
        }
    }

    /// Buffers `reader` without reading more than one byte past the cap.
    pub(crate) fn read_to_end<R: Read>(&self, mut reader: R, field: &str) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        let read = match self.max_body_size {
            Some(max) => reader
                .by_ref()
                .take(max.saturating_add(1) as u64)
                .read_to_end(&mut buf),
            None => reader.read_to_end(&mut buf),
        };
        read.map_err(|err| Error::Body {
            name: field.to_string(),
            source: BodyError::Read(err),
        })?;
        self.check_size(buf.len()).map_err(Error::BodyTooLarge)?;
        Ok(buf)
    }
}
