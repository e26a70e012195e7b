use std::fmt;

use uuid::Uuid;

use crate::error::{ClockError, ClockResult};
use crate::time::vector::{self, PartialOrder};
use crate::types::{EventKind, NodeId, NodeLabel};

// --- Vector Clock -----------------------------------------------------------

/// Vector clock over a fixed set of N processes.
/// Coordinate `i` counts the events of node `i` known to the holder.
#[derive(Clone, Default, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VClock(Vec<u64>);

impl VClock {
    /// The all-zero clock for `process_count` processes.
    pub fn new(process_count: usize) -> Self {
        VClock(vec![0; process_count])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<u64> {
        self.0.get(node).copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u64> {
        self.0
    }

    /// Advances coordinate `node` by one and returns the new value.
    ///
    /// Crate-private: only a `ClockNode` bumps a coordinate, and only its own.
    pub(crate) fn increment(&mut self, node: NodeId) -> ClockResult<u64> {
        let process_count = self.0.len();
        let slot = self
            .0
            .get_mut(node)
            .ok_or(ClockError::UnknownNode { node, process_count })?;
        *slot = slot.checked_add(1).ok_or(ClockError::ClockOverflow { node })?;
        Ok(*slot)
    }

    /// Merges another VClock into this one: `self[k] = max(self[k], other[k])`.
    /// Fails without mutating if the sizes differ.
    pub fn merge_into(&mut self, other: &VClock) -> ClockResult<()> {
        vector::merge_into(&mut self.0, &other.0)
    }

    /// Non-mutating variant of [`VClock::merge_into`].
    pub fn merged(&self, other: &VClock) -> ClockResult<VClock> {
        let mut out = self.clone();
        out.merge_into(other)?;
        Ok(out)
    }

    pub fn compare(&self, other: &VClock) -> ClockResult<PartialOrder> {
        vector::compare(&self.0, &other.0)
    }

    /// `true` if `self` causally precedes `other` (strictly dominated).
    pub fn happened_before(&self, other: &VClock) -> bool {
        matches!(self.compare(other), Ok(PartialOrder::LessThan))
    }

    /// `true` if neither clock dominates the other.
    pub fn concurrent_with(&self, other: &VClock) -> bool {
        matches!(self.compare(other), Ok(PartialOrder::Concurrent))
    }

    /// `true` if every coordinate of `self` is `>=` the matching one in `other`.
    pub fn dominates(&self, other: &VClock) -> bool {
        matches!(
            self.compare(other),
            Ok(PartialOrder::GreaterThan | PartialOrder::Equal)
        )
    }
}

impl From<Vec<u64>> for VClock {
    fn from(coords: Vec<u64>) -> Self {
        VClock(coords)
    }
}

impl fmt::Display for VClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str("]")
    }
}

// --- Payload ----------------------------------------------------------------

/// Opaque message body. The clock protocol never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Payload(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload(s.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload(s.into_bytes())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload(bytes)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

// --- Message ----------------------------------------------------------------

/// A message in flight between two nodes. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: Uuid,        // Shared by the Send and Receive events it produces
    pub sender: NodeId,
    pub payload: Payload,
    pub clock: VClock,   // Sender's clock right after its send increment
}

impl Message {
    pub fn new(sender: NodeId, payload: Payload, clock: VClock) -> Self {
        Message {
            id: Uuid::new_v4(),
            sender,
            payload,
            clock,
        }
    }
}

// --- Event ------------------------------------------------------------------

/// One entry of a node's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub node: NodeId,
    /// Per-node sequence number, 1 for the first event.
    pub seq: u64,
    /// The node's clock immediately after this event.
    pub clock: VClock,
    /// Destination of a Send, origin of a Receive.
    pub peer: Option<NodeId>,
    pub message: Option<Message>,
    /// Delivery outcome of a Send; `None` for other kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered: Option<bool>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.label())?;
        if let (Some(peer), Some(msg)) = (self.peer, &self.message) {
            write!(f, "({}, {:?})", NodeLabel(peer), msg.payload.to_string())?;
        }
        write!(f, ": VC={}", self.clock)?;
        if self.delivered == Some(false) {
            f.write_str(" FAILED")?;
        }
        Ok(())
    }
}
