//!
//! Defines error types for clock nodes, the channel fabric and the simulation.

use crate::primitives::{Event, Message};
use crate::types::NodeId;

/// Errors raised by node operations, transports and the simulation driver.
///
/// None of these are fatal to a running simulation: each one is scoped to the
/// operation (and node) that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Self-send, or a destination outside `[0, N)`. The operation was a no-op.
    #[error("Node {node} cannot send to {destination} (process count {process_count})")]
    InvalidDestination {
        node: NodeId,
        destination: NodeId,
        process_count: usize,
    },
    /// The transport could not hand the message to its destination.
    /// The sender's clock increment and Send event are kept.
    #[error("Channel to node {destination} unavailable: {reason}")]
    ChannelUnavailable { destination: NodeId, reason: String },
    /// A carried clock does not have one coordinate per process.
    #[error("Vector clock size mismatch: expected {expected}, found {found}")]
    ClockSizeMismatch { expected: usize, found: usize },
    /// A received message names a sender that cannot have sent it.
    #[error("Node {node} received a message with invalid sender {sender}")]
    InvalidSender { node: NodeId, sender: NodeId },
    /// A node id that does not exist in this session.
    #[error("Unknown node {node} (process count {process_count})")]
    UnknownNode { node: NodeId, process_count: usize },
    /// Simulations need at least two processes.
    #[error("Invalid process count {0}: at least 2 processes are required")]
    InvalidProcessCount(usize),
    /// The node's own coordinate reached `u64::MAX`.
    #[error("Node {node} has reached the maximum clock value")]
    ClockOverflow { node: NodeId },
    /// Configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A per-node worker thread could not be started.
    #[error("Worker thread error: {0}")]
    Worker(String),
}

pub type ClockResult<T> = std::result::Result<T, ClockError>;

impl From<serde_json::Error> for ClockError {
    fn from(err: serde_json::Error) -> Self {
        ClockError::Config(err.to_string())
    }
}

/// A batch receive that stopped before its queue was empty.
///
/// `applied` holds the events committed before the failure. `rejected` is the
/// message the node refused, already removed from the queue; it is `None`
/// when the transport itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{source} ({} message(s) applied before the failure)", .applied.len())]
pub struct ReceiveError {
    pub applied: Vec<Event>,
    pub rejected: Option<Message>,
    pub source: ClockError,
}

impl From<ClockError> for ReceiveError {
    fn from(source: ClockError) -> Self {
        ReceiveError {
            applied: Vec::new(),
            rejected: None,
            source,
        }
    }
}

impl From<ReceiveError> for ClockError {
    fn from(err: ReceiveError) -> Self {
        err.source
    }
}
