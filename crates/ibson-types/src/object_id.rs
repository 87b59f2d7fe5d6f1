use std::fmt;

/// A 12-byte object identifier, kept as raw bytes.
///
/// ```text
/// ┌──────────┬───────────────────────────────────┐
/// │ Bytes    │ Meaning                           │
/// ├──────────┼───────────────────────────────────┤
/// │ 0..4     │ big-endian seconds since epoch    │
/// │ 4..9     │ per-process random value          │
/// │ 9..12    │ big-endian counter                │
/// └──────────┴───────────────────────────────────┘
/// ```
///
/// The decoder never interprets the layout; [`ObjectId::timestamp`] is a
/// convenience for display.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since the Unix epoch stored in the leading four bytes.
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Lowercase 24-character hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_display() {
        let oid = ObjectId::from_bytes([
            0x65, 0x2F, 0x1A, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0xAA, 0xBB, 0xCC,
        ]);
        assert_eq!(oid.to_string(), "652f1a000102030405aabbcc");
        assert_eq!(format!("{oid:?}"), "ObjectId(652f1a000102030405aabbcc)");
    }

    #[test]
    fn timestamp_is_big_endian() {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&1_700_000_000u32.to_be_bytes());
        assert_eq!(ObjectId::from(bytes).timestamp(), 1_700_000_000);
    }
}
