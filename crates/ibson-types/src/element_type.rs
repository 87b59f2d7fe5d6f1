use ibson_wire::element::element_type as wire;

use crate::error::TypeError;

/// Element type identifiers.
///
/// Each variant maps to the type byte that precedes an element's name on
/// the wire, mirrored by the `ibson_wire::element::element_type` constants.
///
/// ```text
/// ┌──────┬────────────────┬───────────────────────────────────────┐
/// │ Wire │ Variant        │ Payload                               │
/// ├──────┼────────────────┼───────────────────────────────────────┤
/// │ 0x01 │ Double         │ 8-byte IEEE-754                       │
/// │ 0x02 │ String         │ int32 len + UTF-8 + NUL               │
/// │ 0x03 │ Document       │ nested document           (container) │
/// │ 0x04 │ Array          │ nested document, keys "0".."n"        │
/// │ 0x05 │ Binary         │ int32 len + subtype + bytes           │
/// │ 0x06 │ Undefined      │ none (deprecated)                     │
/// │ 0x07 │ ObjectId       │ 12 bytes                              │
/// │ 0x08 │ Boolean        │ 1 byte                                │
/// │ 0x09 │ DateTime       │ int64 epoch millis                    │
/// │ 0x0A │ Null           │ none                                  │
/// │ 0x0B │ Regex          │ cstring pattern + cstring flags       │
/// │ 0x0C │ DbPointer      │ string + 12 bytes (deprecated)        │
/// │ 0x0D │ Code           │ string                                │
/// │ 0x0E │ Symbol         │ string (deprecated)                   │
/// │ 0x0F │ CodeWithScope  │ int32 total + string + document       │
/// │ 0x10 │ Int32          │ 4 bytes                               │
/// │ 0x11 │ Timestamp      │ 8 bytes (increment, time)             │
/// │ 0x12 │ Int64          │ 8 bytes                               │
/// │ 0x13 │ Decimal128     │ 16 bytes                              │
/// │ 0xFF │ MinKey         │ none                                  │
/// │ 0x7F │ MaxKey         │ none                                  │
/// └──────┴────────────────┴───────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Double,
    String,
    Document,
    Array,
    Binary,
    Undefined,
    ObjectId,
    Boolean,
    DateTime,
    Null,
    Regex,
    DbPointer,
    Code,
    Symbol,
    CodeWithScope,
    Int32,
    Timestamp,
    Int64,
    Decimal128,
    MinKey,
    MaxKey,
}

impl ElementType {
    /// Every element type, in wire-byte order (sentinels last).
    pub const ALL: [Self; 21] = [
        Self::Double,
        Self::String,
        Self::Document,
        Self::Array,
        Self::Binary,
        Self::Undefined,
        Self::ObjectId,
        Self::Boolean,
        Self::DateTime,
        Self::Null,
        Self::Regex,
        Self::DbPointer,
        Self::Code,
        Self::Symbol,
        Self::CodeWithScope,
        Self::Int32,
        Self::Timestamp,
        Self::Int64,
        Self::Decimal128,
        Self::MinKey,
        Self::MaxKey,
    ];

    /// Return the single-byte wire ID for this type.
    #[must_use]
    pub fn wire_id(self) -> u8 {
        match self {
            Self::Double => wire::DOUBLE,
            Self::String => wire::STRING,
            Self::Document => wire::DOCUMENT,
            Self::Array => wire::ARRAY,
            Self::Binary => wire::BINARY,
            Self::Undefined => wire::UNDEFINED,
            Self::ObjectId => wire::OBJECT_ID,
            Self::Boolean => wire::BOOLEAN,
            Self::DateTime => wire::DATETIME,
            Self::Null => wire::NULL,
            Self::Regex => wire::REGEX,
            Self::DbPointer => wire::DB_POINTER,
            Self::Code => wire::CODE,
            Self::Symbol => wire::SYMBOL,
            Self::CodeWithScope => wire::CODE_WITH_SCOPE,
            Self::Int32 => wire::INT32,
            Self::Timestamp => wire::TIMESTAMP,
            Self::Int64 => wire::INT64,
            Self::Decimal128 => wire::DECIMAL128,
            Self::MinKey => wire::MIN_KEY,
            Self::MaxKey => wire::MAX_KEY,
        }
    }

    /// Parse a wire byte into an [`ElementType`].
    ///
    /// # Errors
    ///
    /// [`TypeError::UnknownElementType`] for any byte outside the table.
    pub fn from_wire_id(id: u8) -> Result<Self, TypeError> {
        let ty = match id {
            wire::DOUBLE => Self::Double,
            wire::STRING => Self::String,
            wire::DOCUMENT => Self::Document,
            wire::ARRAY => Self::Array,
            wire::BINARY => Self::Binary,
            wire::UNDEFINED => Self::Undefined,
            wire::OBJECT_ID => Self::ObjectId,
            wire::BOOLEAN => Self::Boolean,
            wire::DATETIME => Self::DateTime,
            wire::NULL => Self::Null,
            wire::REGEX => Self::Regex,
            wire::DB_POINTER => Self::DbPointer,
            wire::CODE => Self::Code,
            wire::SYMBOL => Self::Symbol,
            wire::CODE_WITH_SCOPE => Self::CodeWithScope,
            wire::INT32 => Self::Int32,
            wire::TIMESTAMP => Self::Timestamp,
            wire::INT64 => Self::Int64,
            wire::DECIMAL128 => Self::Decimal128,
            wire::MIN_KEY => Self::MinKey,
            wire::MAX_KEY => Self::MaxKey,
            value => return Err(TypeError::UnknownElementType { value }),
        };
        Ok(ty)
    }

    /// Whether values of this type carry a nested document that needs its
    /// own pass: documents, arrays, and code-with-scope (for its scope).
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Document | Self::Array | Self::CodeWithScope)
    }

    /// Short lowercase name, as used in CLI output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Document => "document",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Undefined => "undefined",
            Self::ObjectId => "objectId",
            Self::Boolean => "bool",
            Self::DateTime => "date",
            Self::Null => "null",
            Self::Regex => "regex",
            Self::DbPointer => "dbPointer",
            Self::Code => "javascript",
            Self::Symbol => "symbol",
            Self::CodeWithScope => "javascriptWithScope",
            Self::Int32 => "int",
            Self::Timestamp => "timestamp",
            Self::Int64 => "long",
            Self::Decimal128 => "decimal",
            Self::MinKey => "minKey",
            Self::MaxKey => "maxKey",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
