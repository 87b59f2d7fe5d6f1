use crate::bytes::{find_nul, read_length, read_u8};
use crate::error::WireError;
use crate::header::{DocumentHeader, LENGTH_PREFIX_SIZE};

/// Element type bytes as they appear on the wire.
///
/// The `ibson-types` crate wraps these in the `ElementType` enum; the
/// enumerator below only needs them to size each value.
pub mod element_type {
    pub const DOUBLE: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const DOCUMENT: u8 = 0x03;
    pub const ARRAY: u8 = 0x04;
    pub const BINARY: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const OBJECT_ID: u8 = 0x07;
    pub const BOOLEAN: u8 = 0x08;
    pub const DATETIME: u8 = 0x09;
    pub const NULL: u8 = 0x0A;
    pub const REGEX: u8 = 0x0B;
    pub const DB_POINTER: u8 = 0x0C;
    pub const CODE: u8 = 0x0D;
    pub const SYMBOL: u8 = 0x0E;
    pub const CODE_WITH_SCOPE: u8 = 0x0F;
    pub const INT32: u8 = 0x10;
    pub const TIMESTAMP: u8 = 0x11;
    pub const INT64: u8 = 0x12;
    pub const DECIMAL128: u8 = 0x13;
    pub const MAX_KEY: u8 = 0x7F;
    pub const MIN_KEY: u8 = 0xFF;
}

/// Width of an object id payload.
pub const OBJECT_ID_SIZE: usize = 12;

/// One direct child of a container, located but not decoded.
///
/// All offsets are local: measured from the first byte of the container
/// slice handed to [`Elements::new`], i.e. from its length prefix.
///
/// ```text
///   type │ name bytes ... 0x00 │ value bytes ...
///   ^      ^                     ^
///   │      name_offset           value_offset
///   name_offset - 1
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawElement {
    /// The raw type byte.
    pub element_type: u8,
    /// Start of the element name.
    pub name_offset: usize,
    /// Name length in bytes, terminator excluded.
    pub name_length: usize,
    /// Start of the value payload.
    pub value_offset: usize,
    /// Value payload length in bytes.
    pub value_length: usize,
}

impl RawElement {
    /// Offset of the type byte, i.e. where the element begins.
    #[must_use]
    pub fn start(&self) -> usize {
        self.name_offset - 1
    }

    /// One past the last byte of the value.
    #[must_use]
    pub fn end(&self) -> usize {
        self.value_offset + self.value_length
    }

    /// The name bytes within `container`, terminator excluded.
    ///
    /// `container` must be the slice this element was enumerated from.
    #[must_use]
    pub fn name<'a>(&self, container: &'a [u8]) -> &'a [u8] {
        &container[self.name_offset..self.name_offset + self.name_length]
    }
}

/// Compute the payload length of a value of type `element_type` starting
/// at `value_offset` inside `container`.
///
/// Fixed-width types need no reads; length-prefixed types read their
/// prefix; regex scans two C-strings. Nested documents report their own
/// length prefix without being descended into.
///
/// # Errors
///
/// - [`WireError::UnknownElementType`] for an unrecognised type byte
///   (`offset` points at the value, the caller rebases to the type byte).
/// - Any read error from the prefix or C-string scan.
pub fn value_length(container: &[u8], element_type: u8, value_offset: usize) -> Result<usize, WireError> {
    use crate::element::element_type as t;

    let len = match element_type {
        t::UNDEFINED | t::NULL | t::MIN_KEY | t::MAX_KEY => 0,
        t::BOOLEAN => 1,
        t::INT32 => 4,
        t::DOUBLE | t::DATETIME | t::TIMESTAMP | t::INT64 => 8,
        t::OBJECT_ID => OBJECT_ID_SIZE,
        t::DECIMAL128 => 16,
        t::STRING | t::CODE | t::SYMBOL => LENGTH_PREFIX_SIZE + read_length(container, value_offset)?,
        t::DOCUMENT | t::ARRAY | t::CODE_WITH_SCOPE => read_length(container, value_offset)?,
        // int32 length + subtype byte + payload
        t::BINARY => LENGTH_PREFIX_SIZE + 1 + read_length(container, value_offset)?,
        // string + 12-byte id
        t::DB_POINTER => LENGTH_PREFIX_SIZE + read_length(container, value_offset)? + OBJECT_ID_SIZE,
        t::REGEX => {
            let pattern_end = find_nul(container, value_offset)?;
            let flags_end = find_nul(container, pattern_end + 1)?;
            flags_end + 1 - value_offset
        }
        tag => {
            return Err(WireError::UnknownElementType {
                offset: value_offset,
                tag,
            });
        }
    };
    Ok(len)
}

/// The element enumerator: walks the direct children of exactly one
/// container (document, array, or code-with-scope scope).
///
/// The slice must start at the container's length prefix and end at its
/// terminating NUL. Nested containers are reported as single elements
/// whose value spans the whole nested document; the enumerator never
/// descends into them.
///
/// Enumeration state machine:
///
/// ```text
///   cursor at type byte ──▶ 0x00 at len-1 ──▶ Done
///        │                  0x00 elsewhere ─▶ MissingTerminator
///        ▼
///   scan name to NUL ──▶ size value ──▶ bounds check ──▶ yield, advance
/// ```
///
/// After the first error the iterator is fused and yields nothing more.
///
/// ```rust
/// use ibson_wire::Elements;
///
/// // { "a": 1i32 }
/// let doc = [0x0C, 0, 0, 0, 0x10, b'a', 0, 0x01, 0, 0, 0, 0];
/// let elements: Vec<_> = Elements::new(&doc).unwrap().collect::<Result<_, _>>().unwrap();
/// assert_eq!(elements.len(), 1);
/// assert_eq!(elements[0].value_offset, 7);
/// assert_eq!(elements[0].value_length, 4);
/// ```
pub struct Elements<'a> {
    container: &'a [u8],
    cursor: usize,
    end: usize,
    done: bool,
}

impl<'a> Elements<'a> {
    /// Start enumerating a container.
    ///
    /// The container's header is validated up front; its declared length
    /// must match the slice exactly.
    ///
    /// # Errors
    ///
    /// Any [`DocumentHeader::read_from`] error, or
    /// [`WireError::OutOfBounds`] if the slice is longer than the declared
    /// length (the byte after the terminator is reported).
    pub fn new(container: &'a [u8]) -> Result<Self, WireError> {
        let header = DocumentHeader::read_from(container)?;
        if header.length != container.len() {
            return Err(WireError::OutOfBounds {
                offset: header.length,
                len: container.len() - header.length,
                available: 0,
            });
        }
        let body = header.body_range();
        Ok(Self {
            container,
            cursor: body.start,
            end: body.end,
            done: false,
        })
    }

    fn next_element(&mut self) -> Result<Option<RawElement>, WireError> {
        let start = self.cursor;
        let element_type = read_u8(self.container, start)?;

        if element_type == 0 {
            // Only legal as the document terminator.
            if start == self.end {
                return Ok(None);
            }
            return Err(WireError::MissingTerminator {
                offset: start,
                found: 0,
            });
        }

        let name_offset = start + 1;
        let name_end = find_nul(&self.container[..self.end], name_offset)?;
        let value_offset = name_end + 1;

        let value_length = value_length(&self.container[..self.end], element_type, value_offset)
            .map_err(|e| match e {
                WireError::UnknownElementType { tag, .. } => {
                    WireError::UnknownElementType { offset: start, tag }
                }
                other => other,
            })?;

        let value_end = value_offset
            .checked_add(value_length)
            .filter(|&end| end <= self.end)
            .ok_or(WireError::OutOfBounds {
                offset: value_offset,
                len: value_length,
                available: self.end.saturating_sub(value_offset),
            })?;

        self.cursor = value_end;
        Ok(Some(RawElement {
            element_type,
            name_offset,
            name_length: name_end - name_offset,
            value_offset,
            value_length,
        }))
    }
}

impl Iterator for Elements<'_> {
    type Item = Result<RawElement, WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Elements<'_> {}
