use ibson_pool::PoolError;
use ibson_wire::WireError;

/// Errors that can occur while decoding a document.
///
/// Every offset is absolute: measured from the first byte of the buffer
/// handed to the decoder. All variants are fatal for the call that raised
/// them; no partial tree is ever returned.
///
/// ```text
///   DecodeError
///   ├── MalformedLength       ← length/offset outside the buffer or negative
///   ├── UnknownType           ← type byte outside the known set
///   ├── InconsistentNesting   ← container prefix disagrees with its parent
///   ├── InvalidUtf8           ← strict mode only
///   ├── Malformed(WireError)  ← other framing damage (terminators, tiny docs)
///   ├── DepthLimitExceeded    ← DecoderConfig::max_depth
///   ├── TrailingData          ← bytes after the root document
///   ├── DocumentTooLarge      ← DecoderConfig::max_document_size (streams)
///   ├── Worker(PoolError)     ← parallel decoding only
///   └── Io(std::io::Error)    ← streams only
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A declared or computed length does not fit in the bytes available.
    ///
    /// `declared` is the length that was asked for (negative if the prefix
    /// itself was negative); `available` is how many bytes remained from
    /// `offset`, or 0 when the declared length was negative.
    #[error("malformed length {declared} at offset {offset} ({available} bytes available)")]
    MalformedLength {
        offset: usize,
        declared: i64,
        available: usize,
    },

    /// An element type byte outside the known set.
    #[error("unknown element type {tag:#04X} at offset {offset}")]
    UnknownType { offset: usize, tag: u8 },

    /// A nested container's own length prefix disagrees with the length
    /// its parent implies for it.
    ///
    /// For documents and arrays this cannot happen as the expected length
    /// is read from the same prefix; it guards code-with-scope, where the
    /// scope's length is derived from the enclosing total length.
    #[error("container at offset {offset} declares {found} bytes, expected {expected}")]
    InconsistentNesting {
        offset: usize,
        expected: usize,
        found: i64,
    },

    /// A string payload was not valid UTF-8 and the decoder runs in
    /// [`Utf8Mode::Strict`](crate::Utf8Mode::Strict).
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Framing damage not covered above: a missing NUL terminator, an
    /// unterminated name, an undersized document or an empty string. The
    /// wrapped error's offset is absolute.
    #[error("malformed input: {0}")]
    Malformed(WireError),

    /// A container sits deeper than [`DecoderConfig::max_depth`](crate::DecoderConfig::max_depth).
    #[error("nesting depth exceeds limit of {limit} at offset {offset}")]
    DepthLimitExceeded { offset: usize, limit: usize },

    /// The buffer continues after the root document.
    #[error("unexpected data after root document ({extra_bytes} bytes)")]
    TrailingData { extra_bytes: usize },

    /// A streamed document's length prefix exceeds
    /// [`DecoderConfig::max_document_size`](crate::DecoderConfig::max_document_size).
    #[error("document of {size} bytes exceeds limit of {limit} bytes")]
    DocumentTooLarge { size: usize, limit: usize },

    /// A parallel decode task failed inside the worker pool.
    #[error(transparent)]
    Worker(#[from] PoolError),

    /// I/O error while reading a document stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Convert a [`WireError`] raised on a slice starting at absolute
    /// offset `base`.
    #[must_use]
    pub fn from_wire(err: WireError, base: usize) -> Self {
        match err.rebase(base) {
            WireError::OutOfBounds {
                offset,
                len,
                available,
            } => Self::MalformedLength {
                offset,
                declared: i64::try_from(len).unwrap_or(i64::MAX),
                // `available` is the slice length; report what is left
                // after the read's start instead.
                available: (available + base).saturating_sub(offset),
            },
            WireError::NegativeLength { offset, value } => Self::MalformedLength {
                offset,
                declared: value.into(),
                available: 0,
            },
            WireError::UnknownElementType { offset, tag } => Self::UnknownType { offset, tag },
            WireError::InvalidUtf8 { offset } => Self::InvalidUtf8 { offset },
            WireError::Io(e) => Self::Io(e),
            other => Self::Malformed(other),
        }
    }

    /// The absolute offset this error points at, if it carries one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::MalformedLength { offset, .. }
            | Self::UnknownType { offset, .. }
            | Self::InconsistentNesting { offset, .. }
            | Self::InvalidUtf8 { offset }
            | Self::DepthLimitExceeded { offset, .. } => Some(*offset),
            Self::Malformed(e) => e.offset(),
            Self::TrailingData { .. }
            | Self::DocumentTooLarge { .. }
            | Self::Worker(_)
            | Self::Io(_) => None,
        }
    }
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        Self::from_wire(err, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_becomes_malformed_length() {
        // read of 8 bytes at local offset 6 in a 10-byte slice at base 100
        let wire = WireError::OutOfBounds {
            offset: 6,
            len: 8,
            available: 10,
        };
        let err = DecodeError::from_wire(wire, 100);
        assert!(matches!(
            err,
            DecodeError::MalformedLength {
                offset: 106,
                declared: 8,
                available: 4
            }
        ));
    }

    #[test]
    fn negative_length_keeps_sign() {
        let err = DecodeError::from_wire(WireError::NegativeLength { offset: 0, value: -1 }, 4);
        assert!(matches!(
            err,
            DecodeError::MalformedLength {
                offset: 4,
                declared: -1,
                ..
            }
        ));
    }

    #[test]
    fn unknown_tag_is_rebased() {
        let err = DecodeError::from_wire(WireError::UnknownElementType { offset: 4, tag: 0x20 }, 30);
        assert!(matches!(err, DecodeError::UnknownType { offset: 34, tag: 0x20 }));
        assert_eq!(err.offset(), Some(34));
    }

    #[test]
    fn other_framing_errors_are_wrapped_with_absolute_offset() {
        let err = DecodeError::from_wire(WireError::UnterminatedCString { offset: 5 }, 10);
        assert!(matches!(err, DecodeError::Malformed(_)));
        assert_eq!(err.offset(), Some(15));
    }
}
