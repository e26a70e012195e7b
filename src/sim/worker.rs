//! One OS thread per simulated process.
//!
//! Each worker blocks on its node's inbox and applies every arriving message
//! under the node lock. Rejected messages are logged and kept for the caller
//! in [`WorkerPool::errors`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use crate::channel::{ChannelRegistry, Transport};
use crate::error::{ClockError, ClockResult};
use crate::node::ClockNode;
use crate::types::NodeId;

type ErrorSink = Arc<Mutex<Vec<(NodeId, ClockError)>>>;

/// Handle to the running per-node receive loops.
///
/// Dropping the pool stops and joins every worker.
#[derive(Debug)]
pub struct WorkerPool {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    errors: ErrorSink,
}

impl WorkerPool {
    pub(crate) fn spawn(
        nodes: &[Arc<Mutex<ClockNode>>],
        registry: &Arc<ChannelRegistry>,
        poll: Duration,
        thread_prefix: &str,
    ) -> ClockResult<Self> {
        let mut pool = WorkerPool {
            stop: Arc::new(AtomicBool::new(false)),
            handles: Vec::with_capacity(nodes.len()),
            errors: Arc::new(Mutex::new(Vec::new())),
        };

        for (id, node) in nodes.iter().enumerate() {
            let node = Arc::clone(node);
            let registry = Arc::clone(registry);
            let stop = Arc::clone(&pool.stop);
            let errors = Arc::clone(&pool.errors);
            let handle = std::thread::Builder::new()
                .name(format!("{}-{}", thread_prefix, id))
                .spawn(move || run_worker(id, node, registry, poll, stop, errors))
                .map_err(|e| ClockError::Worker(e.to_string()))?;
            // On error, `pool` drops here and stops the workers already started.
            pool.handles.push(handle);
        }
        tracing::info!(workers = pool.handles.len(), "node workers started");
        Ok(pool)
    }

    /// Number of running worker threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Errors hit by workers so far, removed from the pool.
    pub fn errors(&self) -> Vec<(NodeId, ClockError)> {
        std::mem::take(&mut *self.errors.lock())
    }

    /// Stops every worker, waits for them, and returns any unreported errors.
    pub fn shutdown(mut self) -> Vec<(NodeId, ClockError)> {
        self.stop_and_join();
        self.errors()
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("node worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn run_worker(
    id: NodeId,
    node: Arc<Mutex<ClockNode>>,
    registry: Arc<ChannelRegistry>,
    poll: Duration,
    stop: Arc<AtomicBool>,
    errors: ErrorSink,
) {
    tracing::info!(node = id, "worker running");
    while !stop.load(Ordering::Acquire) {
        match registry.recv_timeout(id, poll) {
            Ok(Some(message)) => {
                if let Err(err) = node.lock().receive(&message) {
                    tracing::warn!(node = id, error = %err, "worker failed to apply message");
                    errors.lock().push((id, err));
                }
            }
            Ok(None) => {}
            Err(err) => {
                // Only a closed registry fails here; nothing more will arrive.
                tracing::info!(node = id, reason = %err, "worker inbox closed");
                break;
            }
        }
    }
    tracing::info!(node = id, "worker stopped");
}
