use ibson_pool::{PoolError, TaskHandle, WorkerPool};
use ibson_types::Document;

use crate::config::DecoderConfig;
use crate::decoder::IterDecoder;
use crate::error::DecodeError;

type DecodeResult = Result<Document, DecodeError>;

/// Decodes independent documents concurrently on a [`WorkerPool`].
///
/// Each task runs one complete [`IterDecoder`] decode on a worker thread;
/// a single document is never split across workers. Results come back
/// through [`TaskHandle`]s, or in input order from
/// [`decode_all`](Self::decode_all).
///
/// ```text
///   submit(bytes) ──▶ queue ──▶ ibson-worker-N: IterDecoder::decode_with
///                                   │
///   TaskHandle::join / wait ◀───────┘ Result<Document, DecodeError>
/// ```
///
/// A worker panic surfaces as [`DecodeError::Worker`] for that document
/// only; the pool replaces the worker and keeps going.
pub struct ParallelDecoder {
    pool: WorkerPool<Vec<u8>, DecodeResult>,
}

impl ParallelDecoder {
    /// Start `workers` threads, each decoding with `config`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Worker`] if the threads cannot be spawned.
    pub fn new(workers: usize, config: DecoderConfig) -> Result<Self, DecodeError> {
        let decoder = IterDecoder::new(config);
        let pool = WorkerPool::new(workers, move |buf: Vec<u8>| decoder.decode_with(&buf))?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Queue one document for decoding.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Worker`] wrapping [`PoolError::Closed`] after
    /// [`close`](Self::close).
    pub fn submit(&self, buf: Vec<u8>) -> Result<TaskHandle<DecodeResult>, DecodeError> {
        Ok(self.pool.submit(buf)?)
    }

    /// Decode every buffer and return the results in input order.
    ///
    /// Blocks the calling thread; do not call it from inside an async
    /// runtime. Use [`submit`](Self::submit) and
    /// [`TaskHandle::join`] there instead.
    pub fn decode_all(&self, buffers: Vec<Vec<u8>>) -> Vec<DecodeResult> {
        let handles: Vec<_> = buffers.into_iter().map(|buf| self.submit(buf)).collect();
        handles
            .into_iter()
            .map(|handle| handle.and_then(|h| flatten(h.wait())))
            .collect()
    }

    /// Stop accepting documents, finish the queued ones and join the
    /// workers.
    pub fn close(&mut self) {
        self.pool.close();
    }
}

/// Fold a pool failure into the decode result it stands in for.
pub(crate) fn flatten(result: Result<DecodeResult, PoolError>) -> DecodeResult {
    result.unwrap_or_else(|e| Err(DecodeError::Worker(e)))
}
