//! Clone and equality over decoded trees with an explicit stack.
//!
//! The decoder accepts nesting as deep as memory allows, so neither
//! operation may recurse per level.

use indexmap::map::Iter;

use crate::document::Document;
use crate::value::Value;

/// A container being copied, with its source position and partial output.
enum Frame<'a> {
    Map {
        entries: Iter<'a, String, Value>,
        out: Document,
        /// Key of the child currently being copied.
        key: String,
        /// Set when the map is a code-with-scope scope.
        source: Option<String>,
    },
    Sequence {
        items: std::slice::Iter<'a, Value>,
        out: Vec<Value>,
    },
}

impl<'a> Frame<'a> {
    fn map(doc: &'a Document, source: Option<String>) -> Self {
        Self::Map {
            entries: doc.iter(),
            out: Document::with_capacity(doc.len()),
            key: String::new(),
            source,
        }
    }

    /// A frame for a container, or the finished copy of a leaf.
    fn open(value: &'a Value) -> Result<Self, Value> {
        let leaf = match value {
            Value::Document(doc) => return Ok(Self::map(doc, None)),
            Value::CodeWithScope { source, scope } => return Ok(Self::map(scope, Some(source.clone()))),
            Value::Array(items) => {
                return Ok(Self::Sequence {
                    items: items.iter(),
                    out: Vec::with_capacity(items.len()),
                });
            }
            Value::Double(v) => Value::Double(*v),
            Value::String(s) => Value::String(s.clone()),
            Value::Binary { subtype, bytes } => Value::Binary {
                subtype: *subtype,
                bytes: bytes.clone(),
            },
            Value::Undefined => Value::Undefined,
            Value::ObjectId(id) => Value::ObjectId(*id),
            Value::Boolean(b) => Value::Boolean(*b),
            Value::DateTime(ms) => Value::DateTime(*ms),
            Value::Null => Value::Null,
            Value::Regex { pattern, flags } => Value::Regex {
                pattern: pattern.clone(),
                flags: flags.clone(),
            },
            Value::DbPointer { namespace, id } => Value::DbPointer {
                namespace: namespace.clone(),
                id: *id,
            },
            Value::Code { source } => Value::Code {
                source: source.clone(),
            },
            Value::Symbol { name } => Value::Symbol { name: name.clone() },
            Value::Int32(n) => Value::Int32(*n),
            Value::Timestamp(ts) => Value::Timestamp(*ts),
            Value::Int64(n) => Value::Int64(*n),
            Value::Decimal128(d) => Value::Decimal128(*d),
            Value::MinKey => Value::MinKey,
            Value::MaxKey => Value::MaxKey,
        };
        Err(leaf)
    }

    fn next_child(&mut self) -> Option<&'a Value> {
        match self {
            Self::Map { entries, key, .. } => entries.next().map(|(name, value)| {
                name.clone_into(key);
                value
            }),
            Self::Sequence { items, .. } => items.next(),
        }
    }

    fn attach(&mut self, child: Value) {
        match self {
            Self::Map { out, key, .. } => {
                out.insert(std::mem::take(key), child);
            }
            Self::Sequence { out, .. } => out.push(child),
        }
    }

    fn finish(self) -> Value {
        match self {
            Self::Map {
                out,
                source: Some(source),
                ..
            } => Value::CodeWithScope { source, scope: out },
            Self::Map { out, .. } => Value::Document(out),
            Self::Sequence { out, .. } => Value::Array(out),
        }
    }
}

pub(crate) fn clone_value(value: &Value) -> Value {
    let mut current = match Frame::open(value) {
        Ok(frame) => frame,
        Err(leaf) => return leaf,
    };
    let mut parents = Vec::new();
    loop {
        if let Some(child) = current.next_child() {
            match Frame::open(child) {
                Ok(frame) => parents.push(std::mem::replace(&mut current, frame)),
                Err(leaf) => current.attach(leaf),
            }
            continue;
        }
        let done = current.finish();
        let Some(mut parent) = parents.pop() else {
            return done;
        };
        parent.attach(done);
        current = parent;
    }
}

pub(crate) fn documents_eq(a: &Document, b: &Document) -> bool {
    let mut pending = Vec::new();
    push_entries(&mut pending, a, b) && drain_eq(pending)
}

pub(crate) fn values_eq(a: &Value, b: &Value) -> bool {
    drain_eq(vec![(a, b)])
}

fn push_entries<'a>(pending: &mut Vec<(&'a Value, &'a Value)>, a: &'a Document, b: &'a Document) -> bool {
    if a.len() != b.len() {
        return false;
    }
    for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
        if ka != kb {
            return false;
        }
        pending.push((va, vb));
    }
    true
}

fn drain_eq<'a>(mut pending: Vec<(&'a Value, &'a Value)>) -> bool {
    while let Some(pair) = pending.pop() {
        let equal = match pair {
            (Value::Document(a), Value::Document(b)) => push_entries(&mut pending, a, b),
            (
                Value::CodeWithScope {
                    source: sa,
                    scope: a,
                },
                Value::CodeWithScope {
                    source: sb,
                    scope: b,
                },
            ) => sa == sb && push_entries(&mut pending, a, b),
            (Value::Array(a), Value::Array(b)) => {
                pending.extend(a.iter().zip(b));
                a.len() == b.len()
            }
            (a, b) => leaf_eq(a, b),
        };
        if !equal {
            return false;
        }
    }
    true
}

fn leaf_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Double(x), Value::Double(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (
            Value::Binary {
                subtype: sx,
                bytes: x,
            },
            Value::Binary {
                subtype: sy,
                bytes: y,
            },
        ) => sx == sy && x == y,
        (Value::Undefined, Value::Undefined)
        | (Value::Null, Value::Null)
        | (Value::MinKey, Value::MinKey)
        | (Value::MaxKey, Value::MaxKey) => true,
        (Value::ObjectId(x), Value::ObjectId(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::DateTime(x), Value::DateTime(y)) | (Value::Int64(x), Value::Int64(y)) => x == y,
        (
            Value::Regex {
                pattern: px,
                flags: fx,
            },
            Value::Regex {
                pattern: py,
                flags: fy,
            },
        ) => px == py && fx == fy,
        (
            Value::DbPointer {
                namespace: nx,
                id: ix,
            },
            Value::DbPointer {
                namespace: ny,
                id: iy,
            },
        ) => nx == ny && ix == iy,
        (Value::Code { source: x }, Value::Code { source: y })
        | (Value::Symbol { name: x }, Value::Symbol { name: y }) => x == y,
        (Value::Int32(x), Value::Int32(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Decimal128(x), Value::Decimal128(y)) => x == y,
        _ => false,
    }
}
