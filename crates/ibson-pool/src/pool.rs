use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;

use crate::error::PoolError;

type Handler<A, T> = dyn Fn(A) -> T + Send + Sync;

struct Task<A, T> {
    args: A,
    reply: oneshot::Sender<Result<T, PoolError>>,
}

/// State shared by the pool handle and every worker thread.
struct Shared<A, T> {
    tasks: Mutex<Receiver<Task<A, T>>>,
    handler: Box<Handler<A, T>>,
    /// Live workers by id. A retiring worker removes its own entry.
    workers: Mutex<Vec<(usize, JoinHandle<()>)>>,
    next_id: AtomicUsize,
    replaced: AtomicUsize,
}

/// A fixed-size pool of OS threads running one handler function.
///
/// Tasks are queued on a channel and picked up by whichever worker is
/// idle; when every worker is busy they wait in submission order. Each
/// task gets exactly one reply through its [`TaskHandle`].
///
/// ```text
///   submit(args) ──▶ [ task channel ] ──▶ worker-0 ─┐
///                                     ──▶ worker-1 ─┼─▶ oneshot reply
///                                     ──▶ worker-n ─┘
/// ```
///
/// A handler panic is caught on the worker, reported to that task's caller
/// as [`PoolError::WorkerPanicked`], and the worker is retired and replaced
/// by a freshly spawned one, so the pool keeps its size.
///
/// Dropping the pool closes it: queued tasks still run, then every worker
/// is joined.
pub struct WorkerPool<A, T> {
    sender: Option<Sender<Task<A, T>>>,
    shared: Arc<Shared<A, T>>,
    size: usize,
}

impl<A, T> WorkerPool<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    /// Start `workers` threads running `handler`. A count of zero is
    /// treated as one.
    ///
    /// # Errors
    ///
    /// [`PoolError::Spawn`] if a thread cannot be started. Workers spawned
    /// before the failure are shut down.
    pub fn new<F>(workers: usize, handler: F) -> Result<Self, PoolError>
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let size = workers.max(1);
        let (sender, receiver) = mpsc::channel();
        let shared = Arc::new(Shared {
            tasks: Mutex::new(receiver),
            handler: Box::new(handler),
            workers: Mutex::new(Vec::with_capacity(size)),
            next_id: AtomicUsize::new(0),
            replaced: AtomicUsize::new(0),
        });

        let mut pool = Self {
            sender: Some(sender),
            shared,
            size,
        };
        for _ in 0..size {
            if let Err(e) = spawn_worker(&pool.shared) {
                pool.close();
                return Err(e);
            }
        }
        tracing::debug!(workers = size, "worker pool started");
        Ok(pool)
    }

    /// Queue `args` for the handler.
    ///
    /// # Errors
    ///
    /// [`PoolError::Closed`] after [`close`](Self::close).
    pub fn submit(&self, args: A) -> Result<TaskHandle<T>, PoolError> {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        let (reply, receiver) = oneshot::channel();
        sender
            .send(Task { args, reply })
            .map_err(|_| PoolError::Closed)?;
        Ok(TaskHandle { receiver })
    }
}

impl<A, T> WorkerPool<A, T> {
    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// How many workers have been replaced after a panic.
    #[must_use]
    pub fn replaced(&self) -> usize {
        self.shared.replaced.load(Ordering::Relaxed)
    }

    /// Number of worker handles the pool is holding on to.
    #[cfg(test)]
    fn tracked_workers(&self) -> usize {
        self.shared
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Stop accepting tasks, let the queued ones finish, and join every
    /// worker. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        // A worker that panics while draining pushes its replacement before
        // exiting, so keep popping until the list stays empty.
        loop {
            let next = self
                .shared
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop();
            let Some((_, handle)) = next else { break };
            if handle.join().is_err() {
                tracing::warn!("worker thread exited abnormally");
            }
        }
        tracing::debug!(replaced = self.replaced(), "worker pool closed");
    }
}

impl<A, T> Drop for WorkerPool<A, T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// The eventual result of one submitted task.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Result<T, PoolError>>,
}

impl<T> TaskHandle<T> {
    /// Await the result from async code.
    ///
    /// # Errors
    ///
    /// The handler's [`PoolError::WorkerPanicked`], or
    /// [`PoolError::Cancelled`] if the task was dropped unanswered.
    pub async fn join(self) -> Result<T, PoolError> {
        self.receiver.await.unwrap_or(Err(PoolError::Cancelled))
    }

    /// Block the current thread until the result arrives.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`join`](Self::join) there.
    ///
    /// # Errors
    ///
    /// Same as [`join`](Self::join).
    pub fn wait(self) -> Result<T, PoolError> {
        self.receiver
            .blocking_recv()
            .unwrap_or(Err(PoolError::Cancelled))
    }
}

fn spawn_worker<A, T>(shared: &Arc<Shared<A, T>>) -> Result<(), PoolError>
where
    A: Send + 'static,
    T: Send + 'static,
{
    let id = shared.next_id.fetch_add(1, Ordering::Relaxed);
    let worker_shared = Arc::clone(shared);
    // Held across the spawn so the new worker cannot retire before its
    // handle is registered.
    let mut workers = shared.workers.lock().unwrap_or_else(PoisonError::into_inner);
    let handle = thread::Builder::new()
        .name(format!("ibson-worker-{id}"))
        .spawn(move || run_worker(id, &worker_shared))?;
    workers.push((id, handle));
    Ok(())
}

/// Drop the handle of a worker that is about to exit. The thread is
/// detached and has only its reply left to send.
fn retire_worker<A, T>(shared: &Shared<A, T>, id: usize) {
    shared
        .workers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .retain(|(worker, _)| *worker != id);
}

fn run_worker<A, T>(id: usize, shared: &Arc<Shared<A, T>>)
where
    A: Send + 'static,
    T: Send + 'static,
{
    loop {
        // Guard is released before the handler runs so idle workers can
        // pick up the next task.
        let next = shared
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        let Ok(Task { args, reply }) = next else {
            // Sender dropped and queue drained.
            return;
        };

        let handler = &shared.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler(args))) {
            Ok(value) => {
                let _ = reply.send(Ok(value));
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                tracing::warn!(worker = id, %message, "worker panicked, replacing it");
                // Replace before replying so the caller sees the new count.
                shared.replaced.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = spawn_worker(shared) {
                    tracing::warn!(error = %e, "could not spawn replacement worker");
                }
                retire_worker(shared, id);
                let _ = reply.send(Err(PoolError::WorkerPanicked {
                    worker: id,
                    message,
                }));
                return;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
