//! Simulation driver: N clock nodes sharing one channel registry.
//!
//! `Simulation` is the control surface a presentation layer or CLI talks to.
//! Every node sits behind its own lock, so operations on one node are
//! serialised while different nodes proceed in parallel. All methods take
//! `&self`; wrap the simulation in an `Arc` to drive it from several threads.

pub mod config;
pub mod worker;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::channel::ChannelRegistry;
use crate::error::{ClockError, ClockResult, ReceiveError};
use crate::node::{ClockNode, NodeSnapshot};
use crate::primitives::{Event, Payload, VClock};
use crate::types::NodeId;

pub use config::{SimConfig, MIN_PROCESS_COUNT};
pub use worker::WorkerPool;

/// What a control-surface call changed, for re-rendering one node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeUpdate {
    pub node: NodeId,
    /// The node's clock after the call.
    pub clock: VClock,
    /// Events appended by the call, oldest first.
    pub new_events: Vec<Event>,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    registry: Arc<ChannelRegistry>,
    nodes: Vec<Arc<Mutex<ClockNode>>>,
}

impl Simulation {
    /// Start a session of `process_count` nodes with default settings.
    pub fn new(process_count: usize) -> ClockResult<Self> {
        Self::with_config(SimConfig::new(process_count))
    }

    pub fn with_config(config: SimConfig) -> ClockResult<Self> {
        config.validate()?;
        let n = config.process_count;
        let nodes = (0..n)
            .map(|id| ClockNode::new(id, n).map(|node| Arc::new(Mutex::new(node))))
            .collect::<ClockResult<Vec<_>>>()?;
        tracing::info!(process_count = n, "simulation started");
        Ok(Simulation {
            registry: Arc::new(ChannelRegistry::new(n)),
            nodes,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn process_count(&self) -> usize {
        self.nodes.len()
    }

    /// The shared message fabric, e.g. for fault injection.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    fn node(&self, id: NodeId) -> ClockResult<&Arc<Mutex<ClockNode>>> {
        self.nodes.get(id).ok_or(ClockError::UnknownNode {
            node: id,
            process_count: self.nodes.len(),
        })
    }

    fn update(node: &ClockNode, new_events: Vec<Event>) -> NodeUpdate {
        NodeUpdate {
            node: node.id(),
            clock: node.current_clock(),
            new_events,
        }
    }

    pub fn trigger_local_event(&self, node: NodeId) -> ClockResult<NodeUpdate> {
        let mut guard = self.node(node)?.lock();
        let event = guard.local_event()?;
        Ok(Self::update(&guard, vec![event]))
    }

    /// Send from `node` to `destination`.
    ///
    /// On `ChannelUnavailable` the sender's clock has still advanced; use
    /// [`Simulation::snapshot`] to re-render it.
    pub fn trigger_send(
        &self,
        node: NodeId,
        destination: NodeId,
        payload: impl Into<Payload>,
    ) -> ClockResult<NodeUpdate> {
        let mut guard = self.node(node)?.lock();
        let event = guard.send(destination, payload, self.registry.as_ref())?;
        Ok(Self::update(&guard, vec![event]))
    }

    /// Applies every message queued for `node`, in arrival order.
    ///
    /// On failure the error still lists the events applied before it; see
    /// [`ClockNode::receive_pending`].
    pub fn poll_and_apply_receives(&self, node: NodeId) -> Result<NodeUpdate, ReceiveError> {
        let mut guard = self.node(node)?.lock();
        let events = guard.receive_pending(self.registry.as_ref())?;
        Ok(Self::update(&guard, events))
    }

    /// Point-in-time view of one node.
    pub fn snapshot(&self, node: NodeId) -> ClockResult<NodeSnapshot> {
        Ok(self.node(node)?.lock().snapshot())
    }

    /// Point-in-time view of every node, in id order. Each node is locked
    /// separately, so the set is not a global cut.
    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(|node| node.lock().snapshot()).collect()
    }

    /// Log entries of `node` with a sequence number greater than `seq`.
    pub fn events_since(&self, node: NodeId, seq: u64) -> ClockResult<Vec<Event>> {
        Ok(self.node(node)?.lock().history().since(seq).to_vec())
    }

    /// Start one receive loop thread per node.
    pub fn spawn_workers(&self) -> ClockResult<WorkerPool> {
        WorkerPool::spawn(
            &self.nodes,
            &self.registry,
            self.config.receive_poll(),
            &self.config.worker_thread_prefix,
        )
    }

    /// Close the fabric. Queued messages are discarded; later sends still
    /// advance the sender's clock but fail with `ChannelUnavailable`.
    pub fn shutdown(&self) {
        self.registry.close();
        tracing::info!("simulation stopped");
    }
}
