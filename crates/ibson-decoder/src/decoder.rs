use ibson_types::{Document, ElementType};
use ibson_wire::bytes::decode_utf8;
use ibson_wire::{DocumentHeader, Elements};

use crate::config::DecoderConfig;
use crate::element::{DecodedElement, decode_element};
use crate::error::DecodeError;
use crate::layout::{container_slice, scope_location};
use crate::observer::{ElementEvent, ElementObserver, NoopObserver};
use crate::queue::{ContainerKind, Job, TraversalOrder, WorkQueue};
use crate::tree::{NodeId, Slot, TreeArena};

/// Counters collected over one decode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Container jobs pushed, root included.
    pub jobs_enqueued: usize,
    /// Container jobs popped and processed. Equal to `jobs_enqueued`
    /// after every successful decode.
    pub jobs_processed: usize,
    /// Elements enumerated across all containers.
    pub elements: usize,
    /// Deepest container reached; the root is 0.
    pub max_depth: usize,
    /// Most jobs pending at once.
    pub max_queue_len: usize,
}

/// The output of [`IterDecoder::decode_observed`].
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub document: Document,
    pub stats: DecodeStats,
}

/// Iterative document decoder.
///
/// Reconstructs the nested tree without recursion: containers are
/// handled one at a time from an explicit FIFO work queue, and their
/// contents are written into an arena addressed by [`NodeId`].
///
/// ```text
///   seed: Job(root, offset 0)
///     │
///     ▼
///   ┌─────────────── pop job ◀──────────────────────────┐
///   │ check prefix, slice container                     │
///   │ for each child element:                           │
///   │   observe → decode → attach to job.target         │
///   │   document / array  → alloc node, push job ───────┤
///   │   code-with-scope   → alloc scope, push job ──────┘
///   └─ queue empty → fold arena into Document
/// ```
///
/// Breadth-first order means every direct child of the root is attached
/// before any grandchild. Nested depth costs heap, never stack.
///
/// The decoder holds only its configuration; each call owns its own
/// queue and arena, so one decoder can be shared across threads.
///
/// # Example
///
/// ```rust
/// use ibson_decoder::IterDecoder;
/// use ibson_types::Value;
///
/// // { "a": 1i32 }
/// let bytes = [0x0C, 0, 0, 0, 0x10, b'a', 0, 0x01, 0, 0, 0, 0];
/// let doc = IterDecoder::decode(&bytes).unwrap();
/// assert_eq!(doc.get("a"), Some(&Value::Int32(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct IterDecoder {
    config: DecoderConfig,
}

impl IterDecoder {
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one document with the default configuration.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; see [`decode_observed`](Self::decode_observed).
    pub fn decode(buf: &[u8]) -> Result<Document, DecodeError> {
        Self::default().decode_with(buf)
    }

    /// Decode one document with this decoder's configuration.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; see [`decode_observed`](Self::decode_observed).
    pub fn decode_with(&self, buf: &[u8]) -> Result<Document, DecodeError> {
        self.decode_observed(buf, &mut NoopObserver)
            .map(|decoded| decoded.document)
    }

    /// Decode one document, reporting every element to `observer` and
    /// returning the decode counters alongside the tree.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MalformedLength`] if any declared length or
    ///   computed offset falls outside the buffer.
    /// - [`DecodeError::UnknownType`] for an unrecognised type byte.
    /// - [`DecodeError::InconsistentNesting`] if a code-with-scope's scope
    ///   disagrees with the room its total length leaves for it.
    /// - [`DecodeError::TrailingData`] if bytes follow the root document
    ///   and the configuration does not allow them.
    /// - [`DecodeError::DepthLimitExceeded`], [`DecodeError::InvalidUtf8`]
    ///   and [`DecodeError::Malformed`] as configured and as found.
    pub fn decode_observed(
        &self,
        buf: &[u8],
        observer: &mut dyn ElementObserver,
    ) -> Result<Decoded, DecodeError> {
        let root_length = self.root_length(buf)?;
        tracing::debug!(bytes = buf.len(), root_length, "decode start");

        let mut queue = WorkQueue::new(TraversalOrder::Fifo);
        let mut arena = TreeArena::new();
        let mut stats = DecodeStats::default();

        queue.push(Job {
            container_offset: 0,
            length: root_length,
            kind: ContainerKind::Map,
            target: NodeId::ROOT,
            depth: 0,
        });

        while let Some(job) = queue.pop() {
            self.process(buf, job, &mut queue, &mut arena, observer, &mut stats)?;
        }

        stats.jobs_enqueued = queue.pushed();
        stats.jobs_processed = queue.popped();
        stats.max_queue_len = queue.max_len();
        debug_assert_eq!(arena.unvisited(), 0, "every placeholder is populated");

        tracing::debug!(
            jobs = stats.jobs_processed,
            elements = stats.elements,
            containers = arena.len(),
            max_depth = stats.max_depth,
            "decode finished"
        );

        Ok(Decoded {
            document: arena.into_document(),
            stats,
        })
    }

    /// Validate the root header and the bytes around it.
    fn root_length(&self, buf: &[u8]) -> Result<usize, DecodeError> {
        let header = DocumentHeader::read_from(buf)?;
        let extra = buf.len() - header.length;
        if extra > 0 && !self.config.allow_trailing_bytes {
            return Err(DecodeError::TrailingData { extra_bytes: extra });
        }
        Ok(header.length)
    }

    /// Enumerate one container and attach its children to `job.target`.
    fn process(
        &self,
        buf: &[u8],
        job: Job,
        queue: &mut WorkQueue,
        arena: &mut TreeArena,
        observer: &mut dyn ElementObserver,
        stats: &mut DecodeStats,
    ) -> Result<(), DecodeError> {
        tracing::trace!(
            offset = job.container_offset,
            length = job.length,
            depth = job.depth,
            kind = ?job.kind,
            "container"
        );

        let base = job.container_offset;
        let container = container_slice(buf, base, job.length)?;
        arena.mark_visited(job.target);
        stats.max_depth = stats.max_depth.max(job.depth);

        let utf8 = self.config.utf8;
        let elements = Elements::new(container).map_err(|e| DecodeError::from_wire(e, base))?;
        for raw in elements {
            let raw = raw.map_err(|e| DecodeError::from_wire(e, base))?;
            let element_type = ElementType::from_wire_id(raw.element_type).map_err(|_| {
                DecodeError::UnknownType {
                    offset: base + raw.start(),
                    tag: raw.element_type,
                }
            })?;
            stats.elements += 1;

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

            // Array keys are positional noise; only maps need the name.
            let name = match job.kind {
                ContainerKind::Map => decode_utf8(raw.name(container), base + raw.name_offset, utf8)
                    .map_err(|e| DecodeError::from_wire(e, 0))?,
                ContainerKind::Sequence => String::new(),
            };

            let value = &container[raw.value_offset..raw.end()];
            let child_depth = job.depth + 1;
            match decode_element(element_type, value, value_offset, utf8)? {
                DecodedElement::Leaf(leaf) => arena.attach(job.target, name, Slot::Leaf(leaf)),
                DecodedElement::Container(kind) => {
                    self.check_depth(child_depth, value_offset)?;
                    let node = arena.alloc(kind);
                    arena.attach(job.target, name, Slot::Node(node));
                    queue.push(Job {
                        container_offset: value_offset,
                        length: raw.value_length,
                        kind,
                        target: node,
                        depth: child_depth,
                    });
                }
                DecodedElement::CodeWithScope {
                    source,
                    code_length,
                } => {
                    let (scope_offset, scope_length) =
                        scope_location(value_offset, raw.value_length, code_length)?;
                    self.check_depth(child_depth, scope_offset)?;
                    let scope = arena.alloc(ContainerKind::Map);
                    arena.attach(job.target, name, Slot::CodeWithScope { source, scope });
                    queue.push(Job {
                        container_offset: scope_offset,
                        length: scope_length,
                        kind: ContainerKind::Map,
                        target: scope,
                        depth: child_depth,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize, offset: usize) -> Result<(), DecodeError> {
        match self.config.max_depth {
            Some(limit) if depth > limit => Err(DecodeError::DepthLimitExceeded { offset, limit }),
            _ => Ok(()),
        }
    }
}
