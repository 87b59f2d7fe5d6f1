/// Errors raised while reading raw BSON bytes.
///
/// Every offset is relative to the start of the slice handed to the failing
/// function. Callers that track where that slice sits inside a larger
/// buffer (the decoder does) rebase the offset before reporting it.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A read of `len` bytes starting at `offset` runs past the end of the
    /// input.
    #[error("read of {len} bytes at offset {offset} exceeds input ({available} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    /// An int32 length prefix was negative.
    #[error("negative length {value} at offset {offset}")]
    NegativeLength { offset: usize, value: i32 },

    /// A document's length prefix is smaller than the 5-byte minimum
    /// (prefix plus terminating NUL).
    #[error("document length {length} at offset {offset} is below the 5-byte minimum")]
    DocumentTooSmall { offset: usize, length: usize },

    /// A string's length prefix was zero, leaving no room for its NUL.
    #[error("string length prefix at offset {offset} is zero")]
    EmptyString { offset: usize },

    /// A document or string did not end with the NUL byte its length
    /// prefix promised, or a document terminator showed up early.
    #[error("expected NUL terminator at offset {offset}, found {found:#04X}")]
    MissingTerminator { offset: usize, found: u8 },

    /// A C-string (element name or regex part) ran to the end of the input
    /// without a NUL.
    #[error("unterminated C-string starting at offset {offset}")]
    UnterminatedCString { offset: usize },

    /// An element type byte outside the known set.
    #[error("unknown element type {tag:#04X} at offset {offset}")]
    UnknownElementType { offset: usize, tag: u8 },

    /// A string payload was not valid UTF-8 (strict mode only).
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// I/O error while reading a document stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// The offset this error points at, if it carries one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::OutOfBounds { offset, .. }
            | Self::NegativeLength { offset, .. }
            | Self::DocumentTooSmall { offset, .. }
            | Self::EmptyString { offset }
            | Self::MissingTerminator { offset, .. }
            | Self::UnterminatedCString { offset }
            | Self::UnknownElementType { offset, .. }
            | Self::InvalidUtf8 { offset } => Some(*offset),
            Self::Io(_) => None,
        }
    }

    /// Shift the carried offset by `base`.
    ///
    /// Readers report offsets relative to the slice they were given; a
    /// caller that handed in `&buf[base..]` uses this to make the error
    /// point into `buf` instead.
    #[must_use]
    pub fn rebase(self, base: usize) -> Self {
        match self {
            Self::OutOfBounds {
                offset,
                len,
                available,
            } => Self::OutOfBounds {
                offset: offset + base,
                len,
                available,
            },
            Self::NegativeLength { offset, value } => Self::NegativeLength {
                offset: offset + base,
                value,
            },
            Self::DocumentTooSmall { offset, length } => Self::DocumentTooSmall {
                offset: offset + base,
                length,
            },
            Self::EmptyString { offset } => Self::EmptyString {
                offset: offset + base,
            },
            Self::MissingTerminator { offset, found } => Self::MissingTerminator {
                offset: offset + base,
                found,
            },
            Self::UnterminatedCString { offset } => Self::UnterminatedCString {
                offset: offset + base,
            },
            Self::UnknownElementType { offset, tag } => Self::UnknownElementType {
                offset: offset + base,
                tag,
            },
            Self::InvalidUtf8 { offset } => Self::InvalidUtf8 {
                offset: offset + base,
            },
            Self::Io(e) => Self::Io(e),
        }
    }
}
