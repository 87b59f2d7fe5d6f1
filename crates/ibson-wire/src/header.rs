use std::ops::Range;

use crate::bytes::read_length;
use crate::error::WireError;

/// Size of the int32 length prefix that opens every document, array and
/// code-with-scope payload.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Smallest legal document: the prefix plus the terminating NUL.
pub const MIN_DOCUMENT_SIZE: usize = 5;

/// The framing shared by documents and arrays.
///
/// ```text
/// ┌────────┬──────────┬──────────────────────────────────────┐
/// │ Offset │ Size     │ Description                          │
/// ├────────┼──────────┼──────────────────────────────────────┤
/// │ 0x00   │ 4 bytes  │ int32 total length (includes itself) │
/// │ 0x04   │ n bytes  │ element list                         │
/// │ len-1  │ 1 byte   │ 0x00 terminator                      │
/// └────────┴──────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Total document length in bytes, prefix and terminator included.
    pub length: usize,
}

impl DocumentHeader {
    /// Parse and validate the header of the document that starts at the
    /// beginning of `buf`.
    ///
    /// Bytes after the declared length are ignored; the caller decides
    /// whether they are an error.
    ///
    /// # Errors
    ///
    /// - [`WireError::OutOfBounds`] if `buf` cannot hold the prefix or the
    ///   declared length.
    /// - [`WireError::NegativeLength`] if the prefix is negative.
    /// - [`WireError::DocumentTooSmall`] if the prefix is below 5.
    /// - [`WireError::MissingTerminator`] if the last byte is not NUL.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        let length = read_length(buf, 0)?;
        if length < MIN_DOCUMENT_SIZE {
            return Err(WireError::DocumentTooSmall { offset: 0, length });
        }
        if length > buf.len() {
            return Err(WireError::OutOfBounds {
                offset: 0,
                len: length,
                available: buf.len(),
            });
        }

        let last = buf[length - 1];
        if last != 0 {
            return Err(WireError::MissingTerminator {
                offset: length - 1,
                found: last,
            });
        }

        Ok(Self { length })
    }

    /// Range of the element list, between the prefix and the terminator.
    #[must_use]
    pub fn body_range(&self) -> Range<usize> {
        LENGTH_PREFIX_SIZE..self.length - 1
    }
}

/// Iterator over back-to-back documents in one buffer, as found in
/// `mongodump` style `.bson` files.
///
/// Yields `(offset, document_bytes)` pairs. Iteration stops after the
/// first error since nothing after a bad length prefix can be located.
pub struct Documents<'a> {
    buf: &'a [u8],
    cursor: usize,
    failed: bool,
}

/// Split a buffer of concatenated documents.
///
/// ```rust
/// use ibson_wire::split_documents;
///
/// let empty = [5u8, 0, 0, 0, 0];
/// let mut file = empty.to_vec();
/// file.extend_from_slice(&empty);
///
/// let docs: Vec<_> = split_documents(&file).collect::<Result<_, _>>().unwrap();
/// assert_eq!(docs.len(), 2);
/// assert_eq!(docs[1].0, 5);
/// ```
#[must_use]
pub fn split_documents(buf: &[u8]) -> Documents<'_> {
    Documents {
        buf,
        cursor: 0,
        failed: false,
    }
}

impl<'a> Iterator for Documents<'a> {
    type Item = Result<(usize, &'a [u8]), WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.buf.len() {
            return None;
        }

        let start = self.cursor;
        match DocumentHeader::read_from(&self.buf[start..]) {
            Ok(header) => {
                self.cursor += header.length;
                Some(Ok((start, &self.buf[start..start + header.length])))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e.rebase(start)))
            }
        }
    }
}
