use ibson_types::ElementType;

use crate::queue::ContainerKind;
use crate::tree::NodeId;

/// One element as seen by the decoder, before its value is materialised.
///
/// All offsets are absolute. `container_node` identifies the container
/// being filled; ids are assigned in discovery order, the root is
/// [`NodeId::ROOT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementEvent {
    pub container_offset: usize,
    pub container_length: usize,
    pub container_kind: ContainerKind,
    pub container_node: NodeId,
    /// Depth of the container; elements of the root are at depth 0.
    pub depth: usize,
    pub element_type: ElementType,
    pub name_offset: usize,
    pub name_length: usize,
    pub value_offset: usize,
    pub value_length: usize,
}

impl ElementEvent {
    /// The raw name bytes, given the buffer the event came from.
    #[must_use]
    pub fn name<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.name_offset..self.name_offset + self.name_length]
    }

    /// The raw value bytes, given the buffer the event came from.
    #[must_use]
    pub fn value<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.value_offset..self.value_offset + self.value_length]
    }
}

/// Side-effect-only hook called once per element, synchronously, in the
/// order the decoder reaches them.
///
/// The hook cannot fail or steer the decode. Closures taking
/// `&ElementEvent` implement it directly:
///
/// ```rust
/// use ibson_decoder::{ElementEvent, IterDecoder};
///
/// let bytes = [0x0C, 0, 0, 0, 0x10, b'a', 0, 0x01, 0, 0, 0, 0];
/// let mut seen = Vec::new();
/// let mut observer = |e: &ElementEvent| seen.push(e.value_offset);
/// IterDecoder::default().decode_observed(&bytes, &mut observer).unwrap();
/// assert_eq!(seen, [7]);
/// ```
pub trait ElementObserver {
    fn on_element(&mut self, event: &ElementEvent);
}

impl<F: FnMut(&ElementEvent)> ElementObserver for F {
    fn on_element(&mut self, event: &ElementEvent) {
        self(event);
    }
}

/// Observer that does nothing. Used when the caller supplies none.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ElementObserver for NoopObserver {
    fn on_element(&mut self, _event: &ElementEvent) {}
}

/// Observer that emits one `tracing` event per element at TRACE level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl ElementObserver for TracingObserver {
    fn on_element(&mut self, event: &ElementEvent) {
        tracing::trace!(
            container = event.container_offset,
            node = event.container_node.index(),
            depth = event.depth,
            element_type = %event.element_type,
            name_offset = event.name_offset,
            value_offset = event.value_offset,
            value_length = event.value_length,
            "element"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> ElementEvent {
        ElementEvent {
            container_offset: 0,
            container_length: 12,
            container_kind: ContainerKind::Map,
            container_node: NodeId::ROOT,
            depth: 0,
            element_type: ElementType::Int32,
            name_offset: 5,
            name_length: 1,
            value_offset: 7,
            value_length: 4,
        }
    }

    #[test]
    fn closures_are_observers() {
        let mut count = 0;
        {
            let mut observer = |_: &ElementEvent| count += 1;
            observer.on_element(&event());
            observer.on_element(&event());
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn event_slices_buffer() {
        let buf = [0x0C, 0, 0, 0, 0x10, b'a', 0, 0x2A, 0, 0, 0, 0];
        let e = event();
        assert_eq!(e.name(&buf), b"a");
        assert_eq!(e.value(&buf), &[0x2A, 0, 0, 0]);
    }

    #[test]
    fn builtin_observers_accept_events() {
        NoopObserver.on_element(&event());
        TracingObserver.on_element(&event());
    }
}
