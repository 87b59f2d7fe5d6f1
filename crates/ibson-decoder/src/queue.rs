use std::collections::VecDeque;

use crate::tree::NodeId;

/// What a container job populates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Named fields: documents and code-with-scope scopes.
    Map,
    /// Positional elements: arrays. Wire keys are ignored.
    Sequence,
}

/// Order in which pending containers are taken off the queue.
///
/// ```text
/// ┌──────┬──────────────────────┬──────────────────────────────────┐
/// │ Mode │ Take from            │ Visit order                      │
/// ├──────┼──────────────────────┼──────────────────────────────────┤
/// │ Fifo │ head                 │ breadth-first, level by level    │
/// │ Lifo │ tail                 │ depth-first, last sibling first  │
/// └──────┴──────────────────────┴──────────────────────────────────┘
/// ```
///
/// Either order produces the same tree; only the order in which
/// containers are processed (and observers see their elements) differs.
/// The tree builder always runs FIFO. The default, LIFO, is the order
/// [`traverse`](crate::traverse) walks in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    Fifo,
    #[default]
    Lifo,
}

/// One container waiting to be enumerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job {
    /// Absolute offset of the container's length prefix.
    pub container_offset: usize,
    /// Length the container must declare in its own prefix.
    pub length: usize,
    pub kind: ContainerKind,
    /// Arena node this job fills in.
    pub target: NodeId,
    /// Nesting depth; the root is 0.
    pub depth: usize,
}

/// The explicit work list that replaces call-stack recursion.
///
/// Every discovered container is pushed exactly once and popped exactly
/// once. The counters let callers check that after a decode.
#[derive(Debug, Default)]
pub struct WorkQueue {
    jobs: VecDeque<Job>,
    order: TraversalOrder,
    pushed: usize,
    popped: usize,
    max_len: usize,
}

impl WorkQueue {
    #[must_use]
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push_back(job);
        self.pushed += 1;
        self.max_len = self.max_len.max(self.jobs.len());
    }

    pub fn pop(&mut self) -> Option<Job> {
        let job = match self.order {
            TraversalOrder::Fifo => self.jobs.pop_front(),
            TraversalOrder::Lifo => self.jobs.pop_back(),
        }?;
        self.popped += 1;
        Some(job)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Total jobs ever pushed.
    #[must_use]
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Total jobs ever popped.
    #[must_use]
    pub fn popped(&self) -> usize {
        self.popped
    }

    /// High-water mark of pending jobs.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
