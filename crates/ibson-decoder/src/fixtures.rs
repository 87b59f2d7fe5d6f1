//! Hand-built wire fixtures for unit tests.

/// Wrap an element list in a length prefix and terminator.
pub(crate) fn doc(body: &[u8]) -> Vec<u8> {
    let mut out = i32::try_from(body.len() + 5).unwrap().to_le_bytes().to_vec();
    out.extend_from_slice(body);
    out.push(0);
    out
}

/// One element: type byte, NUL-terminated name, value bytes.
pub(crate) fn elem(tag: u8, name: &str, value: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(value);
    out
}

/// A length-prefixed string payload.
pub(crate) fn string(s: &str) -> Vec<u8> {
    let mut out = i32::try_from(s.len() + 1).unwrap().to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

/// A code-with-scope payload with a correct total length.
pub(crate) fn code_with_scope(source: &str, scope: &[u8]) -> Vec<u8> {
    let mut out = vec![0; 4];
    out.extend(string(source));
    out.extend_from_slice(scope);
    let total = i32::try_from(out.len()).unwrap().to_le_bytes();
    out[..4].copy_from_slice(&total);
    out
}

/// Concatenate element encodings.
pub(crate) fn cat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}
