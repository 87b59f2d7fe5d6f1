use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter, Keys, Values};

use crate::deep;
use crate::value::Value;

/// A decoded document: string keys mapped to values, in wire order.
///
/// Inserting a key that is already present replaces the value but keeps
/// the key at the position of its first occurrence. Encoders should not
/// produce duplicates, but when they do the last value wins.
#[derive(Debug, Default)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a nested value by dotted path, e.g. `"a.b.0"`. Array steps
    /// use decimal indices.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Value::Document(doc) => doc.get(part)?,
                Value::CodeWithScope { scope, .. } => scope.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> Values<'_, String, Value> {
        self.entries.values()
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let nested = |v: &Value| {
            matches!(
                v,
                Value::Document(_) | Value::Array(_) | Value::CodeWithScope { .. }
            )
        };
        if !self.entries.values().any(nested) {
            return;
        }

        let mut stack: Vec<Value> = self.entries.drain(..).map(|(_, v)| v).collect();
        while let Some(value) = stack.pop() {
            match value {
                Value::Document(mut doc) | Value::CodeWithScope { scope: mut doc, .. } => {
                    stack.extend(doc.entries.drain(..).map(|(_, v)| v));
                }
                Value::Array(items) => stack.extend(items),
                _ => {}
            }
        }
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        deep::documents_eq(self, other)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(mut self) -> Self::IntoIter {
        std::mem::take(&mut self.entries).into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let doc: Document = [("c", 1), ("a", 2), ("b", 3)].into_iter().collect();
        let keys: Vec<_> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, ["c", "a", "b"]);
    }

    #[test]
    fn duplicate_key_keeps_first_position_last_value() {
        let mut doc = Document::new();
        doc.insert("x", 1);
        doc.insert("y", 2);
        let replaced = doc.insert("x", 3);

        assert_eq!(replaced, Some(Value::Int32(1)));
        assert_eq!(doc.len(), 2);
        let entries: Vec<_> = doc.iter().map(|(k, v)| (k.as_str(), v.as_i32())).collect();
        assert_eq!(entries, [("x", Some(3)), ("y", Some(2))]);
    }

    #[test]
    fn dotted_path_lookup() {
        let mut inner = Document::new();
        inner.insert("list", vec![Value::Null, Value::from("hit")]);
        let mut doc = Document::new();
        doc.insert("outer", inner);

        assert_eq!(doc.get_path("outer.list.1"), Some(&Value::from("hit")));
        assert_eq!(doc.get_path("outer.list.9"), None);
        assert_eq!(doc.get_path("outer.missing"), None);
        assert_eq!(doc.get_path("outer.list.x"), None);
    }

    #[test]
    fn deep_tree_drops_iteratively() {
        let mut doc = Document::new();
        for _ in 0..100_000 {
            let mut parent = Document::new();
            parent.insert("d", vec![Value::Document(doc)]);
            doc = parent;
        }
        drop(doc);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab: Document = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: Document = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
    }
}
