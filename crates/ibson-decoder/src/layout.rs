use ibson_wire::bytes::{checked_range, read_i32_le};
use ibson_wire::header::LENGTH_PREFIX_SIZE;

use crate::error::DecodeError;

/// Bytes before the code string inside a code-with-scope payload: the
/// int32 total length and the code string's own int32 length.
const CODE_WITH_SCOPE_HEADER: usize = 2 * LENGTH_PREFIX_SIZE;

/// Slice the container at absolute `offset`, checking its own length
/// prefix against `expected`.
///
/// # Errors
///
/// - [`DecodeError::MalformedLength`] if the prefix or the range
///   `offset..offset + expected` does not fit in `buf`.
/// - [`DecodeError::InconsistentNesting`] if the prefix says anything
///   other than `expected`.
pub(crate) fn container_slice(buf: &[u8], offset: usize, expected: usize) -> Result<&[u8], DecodeError> {
    let found = read_i32_le(buf, offset).map_err(DecodeError::from)?;
    if usize::try_from(found).ok() != Some(expected) {
        return Err(DecodeError::InconsistentNesting {
            offset,
            expected,
            found: found.into(),
        });
    }
    checked_range(buf, offset, expected).map_err(DecodeError::from)
}

/// Locate the scope document inside a code-with-scope value.
///
/// ```text
///   value_offset
///   │
///   ▼
///   ┌─────────┬──────────┬──────────────────┬───────────────────┐
///   │ int32 T │ int32 L  │ L bytes of code  │ scope document    │
///   └─────────┴──────────┴──────────────────┴───────────────────┘
///   ◀──────────────────────────── T ───────────────────────────▶
///
///   scope_offset = value_offset + 8 + L
///   scope_length = T - 8 - L
/// ```
///
/// `code_length` is `L`, the code string's length prefix (terminator
/// included). The same formula applies whether the value sits in a
/// document, an array or another scope.
///
/// # Errors
///
/// [`DecodeError::MalformedLength`] if the code string claims more room
/// than the total length leaves for it.
pub(crate) fn scope_location(
    value_offset: usize,
    total_length: usize,
    code_length: usize,
) -> Result<(usize, usize), DecodeError> {
    let header = CODE_WITH_SCOPE_HEADER + code_length;
    let scope_length = total_length
        .checked_sub(header)
        .ok_or(DecodeError::MalformedLength {
            offset: value_offset + LENGTH_PREFIX_SIZE,
            declared: i64::try_from(code_length).unwrap_or(i64::MAX),
            available: total_length.saturating_sub(CODE_WITH_SCOPE_HEADER),
        })?;
    Ok((value_offset + header, scope_length))
}
