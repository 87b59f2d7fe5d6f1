use crate::error::WireError;

// Every reader here takes the slice plus an offset into it and never
// panics: a short slice is reported as `OutOfBounds` with the offset the
// read started at. All multi-byte values in BSON are little-endian.

/// How string payloads are turned into Rust `String`s.
///
/// ```text
/// ┌────────┬──────────────────────────────────────────────────┐
/// │ Mode   │ Behaviour on invalid UTF-8                       │
/// ├────────┼──────────────────────────────────────────────────┤
/// │ Strict │ WireError::InvalidUtf8 (default)                 │
/// │ Lossy  │ invalid sequences become U+FFFD                  │
/// └────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Utf8Mode {
    #[default]
    Strict,
    Lossy,
}

/// Borrow `len` bytes starting at `offset`.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if the range overflows or ends past the slice.
pub fn checked_range(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], WireError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(WireError::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        })
}

/// Copy exactly `N` bytes starting at `offset` into an array.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if fewer than `N` bytes remain.
pub fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], WireError> {
    let bytes = checked_range(buf, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Read one byte.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if `offset` is past the end.
pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, WireError> {
    buf.get(offset).copied().ok_or(WireError::OutOfBounds {
        offset,
        len: 1,
        available: buf.len(),
    })
}

/// Read a little-endian `i32`.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if fewer than 4 bytes remain.
pub fn read_i32_le(buf: &[u8], offset: usize) -> Result<i32, WireError> {
    read_array(buf, offset).map(i32::from_le_bytes)
}

/// Read a little-endian `i64`.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if fewer than 8 bytes remain.
pub fn read_i64_le(buf: &[u8], offset: usize) -> Result<i64, WireError> {
    read_array(buf, offset).map(i64::from_le_bytes)
}

/// Read a little-endian `u64`.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if fewer than 8 bytes remain.
pub fn read_u64_le(buf: &[u8], offset: usize) -> Result<u64, WireError> {
    read_array(buf, offset).map(u64::from_le_bytes)
}

/// Read a little-endian IEEE-754 double.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if fewer than 8 bytes remain.
pub fn read_f64_le(buf: &[u8], offset: usize) -> Result<f64, WireError> {
    read_array(buf, offset).map(f64::from_le_bytes)
}

/// Read an int32 length prefix and convert it to `usize`.
///
/// BSON stores every length (documents, strings, binaries, code-with-scope)
/// as a signed 32-bit integer, so a negative value is always corruption.
///
/// # Errors
///
/// - [`WireError::OutOfBounds`] if fewer than 4 bytes remain.
/// - [`WireError::NegativeLength`] if the prefix is negative.
pub fn read_length(buf: &[u8], offset: usize) -> Result<usize, WireError> {
    let value = read_i32_le(buf, offset)?;
    usize::try_from(value).map_err(|_| WireError::NegativeLength { offset, value })
}

/// Find the first NUL byte at or after `from`, returning its index.
///
/// # Errors
///
/// [`WireError::UnterminatedCString`] if no NUL follows `from`.
pub fn find_nul(buf: &[u8], from: usize) -> Result<usize, WireError> {
    buf.get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == 0))
        .map(|pos| from + pos)
        .ok_or(WireError::UnterminatedCString { offset: from })
}

/// Copy `len` bytes starting at `offset` into an owned buffer.
///
/// Used for binary payloads and object ids so the decoded tree never
/// borrows from the input.
///
/// # Errors
///
/// [`WireError::OutOfBounds`] if the range ends past the slice.
pub fn copy_bytes(buf: &[u8], offset: usize, len: usize) -> Result<Vec<u8>, WireError> {
    checked_range(buf, offset, len).map(<[u8]>::to_vec)
}

/// Decode `bytes` as UTF-8. `offset` is where `bytes` starts in the
/// caller's buffer and is only used for error reporting.
///
/// # Errors
///
/// [`WireError::InvalidUtf8`] in [`Utf8Mode::Strict`] when the bytes are
/// not valid UTF-8. Lossy mode never fails.
pub fn decode_utf8(bytes: &[u8], offset: usize, mode: Utf8Mode) -> Result<String, WireError> {
    match mode {
        Utf8Mode::Strict => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| WireError::InvalidUtf8 {
                offset: offset + e.valid_up_to(),
            }),
        Utf8Mode::Lossy => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Read a NUL-terminated string starting at `offset`.
///
/// Returns the decoded text and the number of bytes consumed, terminator
/// included.
///
/// # Errors
///
/// [`WireError::UnterminatedCString`] or [`WireError::InvalidUtf8`].
pub fn read_cstring(buf: &[u8], offset: usize, mode: Utf8Mode) -> Result<(String, usize), WireError> {
    let nul = find_nul(buf, offset)?;
    let text = decode_utf8(&buf[offset..nul], offset, mode)?;
    Ok((text, nul + 1 - offset))
}

/// Read a length-prefixed BSON string starting at `offset`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────┬──────┐
/// │ int32 len L  │ L - 1 bytes of UTF-8         │ 0x00 │
/// └──────────────┴──────────────────────────────┴──────┘
/// ```
///
/// Returns the decoded text (terminator excluded) and the number of bytes
/// consumed, `4 + L`.
///
/// # Errors
///
/// - [`WireError::OutOfBounds`] / [`WireError::NegativeLength`] for a bad prefix.
/// - [`WireError::EmptyString`] if `L == 0`.
/// - [`WireError::MissingTerminator`] if the last byte is not NUL.
/// - [`WireError::InvalidUtf8`] in strict mode.
pub fn read_string(buf: &[u8], offset: usize, mode: Utf8Mode) -> Result<(String, usize), WireError> {
    let len = read_length(buf, offset)?;
    if len == 0 {
        return Err(WireError::EmptyString { offset });
    }
    let start = offset + 4;
    let bytes = checked_range(buf, start, len)?;
    let last = bytes[len - 1];
    if last != 0 {
        return Err(WireError::MissingTerminator {
            offset: start + len - 1,
            found: last,
        });
    }
    let text = decode_utf8(&bytes[..len - 1], start, mode)?;
    Ok((text, 4 + len))
}
