use ibson_types::ElementType;
use ibson_wire::bytes::read_length;
use ibson_wire::{DocumentHeader, Elements};

use crate::error::DecodeError;
use crate::layout::{container_slice, scope_location};
use crate::observer::{ElementEvent, ElementObserver};
use crate::queue::{ContainerKind, Job, TraversalOrder, WorkQueue};
use crate::tree::NodeId;

/// Counters from one [`traverse`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Containers enumerated, root included.
    pub containers: usize,
    /// Elements reported to the observer.
    pub elements: usize,
    /// Deepest container reached; the root is 0.
    pub max_depth: usize,
    /// Most containers pending at once.
    pub max_queue_len: usize,
}

/// Walk every element of every container in `buf` without building a
/// tree, reporting each one to `observer`.
///
/// Scopes of code-with-scope values are walked like documents. With
/// [`TraversalOrder::Lifo`] the most recently discovered container is
/// entered next, which gives a depth-first walk visiting the last sibling
/// first; [`TraversalOrder::Fifo`] matches the decoder's order.
///
/// Values are located but never decoded, so string contents are not
/// checked for UTF-8. Bytes after the root document are ignored.
///
/// # Errors
///
/// The structural errors of [`IterDecoder`](crate::IterDecoder):
/// [`DecodeError::MalformedLength`], [`DecodeError::UnknownType`],
/// [`DecodeError::InconsistentNesting`] and [`DecodeError::Malformed`].
pub fn traverse(
    buf: &[u8],
    order: TraversalOrder,
    observer: &mut dyn ElementObserver,
) -> Result<TraversalStats, DecodeError> {
    let header = DocumentHeader::read_from(buf)?;
    let mut queue = WorkQueue::new(order);
    let mut stats = TraversalStats::default();
    let mut next_node = 1;

    queue.push(Job {
        container_offset: 0,
        length: header.length,
        kind: ContainerKind::Map,
        target: NodeId::ROOT,
        depth: 0,
    });

    while let Some(job) = queue.pop() {
        let base = job.container_offset;
        let container = container_slice(buf, base, job.length)?;
        stats.containers += 1;
        stats.max_depth = stats.max_depth.max(job.depth);

        for raw in Elements::new(container).map_err(|e| DecodeError::from_wire(e, base))? {
            let raw = raw.map_err(|e| DecodeError::from_wire(e, base))?;
            let element_type =
                ElementType::from_wire_id(raw.element_type).map_err(|_| DecodeError::UnknownType {
                    offset: base + raw.start(),
                    tag: raw.element_type,
                })?;
            let value_offset = base + raw.value_offset;

            observer.on_element(&ElementEvent {
                container_offset: base,
                container_length: job.length,
                container_kind: job.kind,
                container_node: job.target,
                depth: job.depth,
                element_type,
                name_offset: base + raw.name_offset,
                name_length: raw.name_length,
                value_offset,
                value_length: raw.value_length,
            });
            stats.elements += 1;

            let nested = match element_type {
                ElementType::Document => Some((value_offset, raw.value_length, ContainerKind::Map)),
                ElementType::Array => Some((value_offset, raw.value_length, ContainerKind::Sequence)),
                ElementType::CodeWithScope => {
                    // code string prefix sits after the total length
                    let code_length = read_length(buf, value_offset + 4)?;
                    let (offset, length) = scope_location(value_offset, raw.value_length, code_length)?;
                    Some((offset, length, ContainerKind::Map))
                }
                _ => None,
            };

            if let Some((container_offset, length, kind)) = nested {
                queue.push(Job {
                    container_offset,
                    length,
                    kind,
                    target: NodeId::new(next_node),
                    depth: job.depth + 1,
                });
                next_node += 1;
            }
        }
    }

    stats.max_queue_len = queue.max_len();
    tracing::debug!(
        containers = stats.containers,
        elements = stats.elements,
        ?order,
        "traversal finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cat, code_with_scope, doc, elem, string};
    use ibson_wire::element::element_type as t;

    fn names(buf: &[u8], order: TraversalOrder) -> Vec<String> {
        let mut out = Vec::new();
        let mut observer = |e: &ElementEvent| out.push(String::from_utf8_lossy(e.name(buf)).into_owned());
        traverse(buf, order, &mut observer).unwrap();
        out
    }

    /// { a: { a1: null }, b: { b1: null }, c: null }
    fn two_branches() -> Vec<u8> {
        doc(&cat(&[
            elem(t::DOCUMENT, "a", &doc(&elem(t::NULL, "a1", &[]))),
            elem(t::DOCUMENT, "b", &doc(&elem(t::NULL, "b1", &[]))),
            elem(t::NULL, "c", &[]),
        ]))
    }

    #[test]
    fn fifo_is_breadth_first() {
        assert_eq!(names(&two_branches(), TraversalOrder::Fifo), ["a", "b", "c", "a1", "b1"]);
    }

    #[test]
    fn lifo_enters_last_container_first() {
        assert_eq!(names(&two_branches(), TraversalOrder::Lifo), ["a", "b", "c", "b1", "a1"]);
    }

    #[test]
    fn walks_code_with_scope_scopes() {
        let scope = doc(&elem(t::STRING, "inside", &string("v")));
        let buf = doc(&elem(t::CODE_WITH_SCOPE, "f", &code_with_scope("go()", &scope)));
        assert_eq!(names(&buf, TraversalOrder::default()), ["f", "inside"]);
    }

    #[test]
    fn stats_and_node_ids() {
        let buf = two_branches();
        let mut nodes = Vec::new();
        let mut observer = |e: &ElementEvent| nodes.push(e.container_node.index());
        let stats = traverse(&buf, TraversalOrder::Fifo, &mut observer).unwrap();
        assert_eq!(nodes, [0, 0, 0, 1, 2]);
        assert_eq!(
            stats,
            TraversalStats {
                containers: 3,
                elements: 5,
                max_depth: 1,
                max_queue_len: 2,
            }
        );
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut buf = two_branches();
        buf.push(0x99);
        assert_eq!(names(&buf, TraversalOrder::Fifo).len(), 5);
    }

    #[test]
    fn malformed_nested_container_fails() {
        let mut buf = two_branches();
        // { a1: null } is 9 bytes starting at 7
        buf[7 + 9 - 1] = 0x01;
        assert!(traverse(&buf, TraversalOrder::Fifo, &mut |_: &ElementEvent| {}).is_err());
    }
}
