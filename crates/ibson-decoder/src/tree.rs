use ibson_types::{Document, Value};
use indexmap::IndexMap;

use crate::queue::ContainerKind;

/// Index of a container node in the decode arena.
///
/// Ids are handed out in discovery order, so a child's id is always
/// greater than its parent's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root document.
    pub const ROOT: Self = Self(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What sits at one key or position of a container while the tree is
/// still being built.
#[derive(Debug)]
pub(crate) enum Slot {
    Leaf(Value),
    /// A document or array populated by its own job.
    Node(NodeId),
    /// Code-with-scope: the source is final, the scope is a Map node.
    CodeWithScope { source: String, scope: NodeId },
}

#[derive(Debug)]
enum Children {
    Map(IndexMap<String, Slot>),
    Sequence(Vec<Slot>),
}

#[derive(Debug)]
struct Node {
    children: Children,
    visited: bool,
}

/// Flat storage for every container of one decode call.
///
/// Jobs refer to their target by [`NodeId`] instead of holding a borrow,
/// so any number of placeholders can be pending at once. Once the queue
/// drains, [`into_document`](Self::into_document) folds the arena into an
/// owned [`Document`].
#[derive(Debug)]
pub(crate) struct TreeArena {
    nodes: Vec<Node>,
}

impl TreeArena {
    /// An arena holding just the (unvisited) root map.
    pub(crate) fn new() -> Self {
        let mut arena = Self { nodes: Vec::new() };
        arena.alloc(ContainerKind::Map);
        arena
    }

    /// Allocate an empty placeholder container.
    pub(crate) fn alloc(&mut self, kind: ContainerKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let children = match kind {
            ContainerKind::Map => Children::Map(IndexMap::new()),
            ContainerKind::Sequence => Children::Sequence(Vec::new()),
        };
        self.nodes.push(Node {
            children,
            visited: false,
        });
        id
    }

    /// Attach `slot` to `parent`: under `name` for maps (last write wins,
    /// first position kept), appended for sequences (name ignored).
    pub(crate) fn attach(&mut self, parent: NodeId, name: String, slot: Slot) {
        match &mut self.nodes[parent.0].children {
            Children::Map(entries) => {
                entries.insert(name, slot);
            }
            Children::Sequence(items) => items.push(slot),
        }
    }

    pub(crate) fn mark_visited(&mut self, id: NodeId) {
        self.nodes[id.0].visited = true;
    }

    /// Placeholders whose job never ran. Zero after a successful decode.
    pub(crate) fn unvisited(&self) -> usize {
        self.nodes.iter().filter(|n| !n.visited).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Assemble the owned tree.
    ///
    /// Walks ids from highest to lowest: every child of node `n` has an id
    /// above `n` and is therefore already assembled when `n` is reached.
    /// No recursion, so depth is bounded only by memory.
    pub(crate) fn into_document(self) -> Document {
        let mut built: Vec<Option<Value>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);

        for (index, node) in self.nodes.into_iter().enumerate().rev() {
            let value = match node.children {
                Children::Map(entries) => {
                    let mut doc = Document::with_capacity(entries.len());
                    for (name, slot) in entries {
                        doc.insert(name, resolve(&mut built, slot));
                    }
                    Value::Document(doc)
                }
                Children::Sequence(items) => {
                    Value::Array(items.into_iter().map(|slot| resolve(&mut built, slot)).collect())
                }
            };
            built[index] = Some(value);
        }

        match built.into_iter().next().flatten() {
            Some(Value::Document(doc)) => doc,
            _ => Document::new(),
        }
    }
}

fn resolve(built: &mut [Option<Value>], slot: Slot) -> Value {
    match slot {
        Slot::Leaf(value) => value,
        Slot::Node(id) => take(built, id),
        Slot::CodeWithScope { source, scope } => {
            let scope = match take(built, scope) {
                Value::Document(doc) => doc,
                _ => Document::new(),
            };
            Value::CodeWithScope { source, scope }
        }
    }
}

fn take(built: &mut [Option<Value>], id: NodeId) -> Value {
    built[id.0]
        .take()
        .expect("child node assembled before its parent")
}
