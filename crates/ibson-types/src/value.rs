use crate::deep;
use crate::document::Document;
use crate::element_type::ElementType;
use crate::object_id::ObjectId;

/// The 128 bits of a decimal128 value, split into two little-endian
/// halves exactly as they sit on the wire.
///
/// ```text
/// wire bytes:  b0 b1 .. b7 │ b8 b9 .. b15
///              └── low ──┘   └── high ──┘
/// ```
///
/// The IEEE-754-2008 decimal semantics are not interpreted; the bits are
/// only preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    pub low: i64,
    pub high: i64,
}

impl Decimal128 {
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        high.copy_from_slice(&bytes[8..]);
        Self {
            low: i64::from_le_bytes(low),
            high: i64::from_le_bytes(high),
        }
    }

    /// The 16 wire bytes this value was decoded from.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.low.to_le_bytes());
        out[8..].copy_from_slice(&self.high.to_le_bytes());
        out
    }
}

/// One node of a decoded tree: a container or a leaf.
///
/// The set of variants is closed and mirrors [`ElementType`] one-to-one,
/// so every decoded value can report the tag it came from.
///
/// ```text
/// ┌────────────────┬───────────────────────────────────────────┐
/// │ Variant        │ Notes                                     │
/// ├────────────────┼───────────────────────────────────────────┤
/// │ Document       │ insertion-ordered map                     │
/// │ Array          │ positional, wire keys discarded           │
/// │ Binary         │ owned copy of the payload                 │
/// │ CodeWithScope  │ scope is a fully decoded Document         │
/// │ Timestamp      │ raw u64; time = high 32, increment = low  │
/// │ Decimal128     │ raw bits, see [`Decimal128`]              │
/// │ MinKey/MaxKey  │ sentinels, never equal to any other value │
/// └────────────────┴───────────────────────────────────────────┘
/// ```
///
/// `Clone` and `PartialEq`, like dropping a [`Document`], use an explicit
/// stack, so they handle any depth the decoder accepts. `Debug` still
/// recurses per level; avoid formatting trees nested thousands deep.
#[derive(Debug)]
pub enum Value {
    Double(f64),
    String(String),
    Document(Document),
    Array(Vec<Value>),
    Binary { subtype: u8, bytes: Vec<u8> },
    Undefined,
    ObjectId(ObjectId),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Null,
    Regex { pattern: String, flags: String },
    DbPointer { namespace: String, id: ObjectId },
    Code { source: String },
    Symbol { name: String },
    CodeWithScope { source: String, scope: Document },
    Int32(i32),
    Timestamp(u64),
    Int64(i64),
    Decimal128(Decimal128),
    MinKey,
    MaxKey,
}

impl Value {
    /// The element type this value is encoded as.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
            Self::Document(_) => ElementType::Document,
            Self::Array(_) => ElementType::Array,
            Self::Binary { .. } => ElementType::Binary,
            Self::Undefined => ElementType::Undefined,
            Self::ObjectId(_) => ElementType::ObjectId,
            Self::Boolean(_) => ElementType::Boolean,
            Self::DateTime(_) => ElementType::DateTime,
            Self::Null => ElementType::Null,
            Self::Regex { .. } => ElementType::Regex,
            Self::DbPointer { .. } => ElementType::DbPointer,
            Self::Code { .. } => ElementType::Code,
            Self::Symbol { .. } => ElementType::Symbol,
            Self::CodeWithScope { .. } => ElementType::CodeWithScope,
            Self::Int32(_) => ElementType::Int32,
            Self::Timestamp(_) => ElementType::Timestamp,
            Self::Int64(_) => ElementType::Int64,
            Self::Decimal128(_) => ElementType::Decimal128,
            Self::MinKey => ElementType::MinKey,
            Self::MaxKey => ElementType::MaxKey,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The seconds half of a timestamp (upper 32 bits).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn timestamp_time(&self) -> Option<u32> {
        match self {
            Self::Timestamp(raw) => Some((raw >> 32) as u32),
            _ => None,
        }
    }

    /// The ordinal half of a timestamp (lower 32 bits).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn timestamp_increment(&self) -> Option<u32> {
        match self {
            Self::Timestamp(raw) => Some(*raw as u32),
            _ => None,
        }
    }

    /// Whether this is a document or array.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Document(_) | Self::Array(_))
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        deep::clone_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep::values_eq(self, other)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}
