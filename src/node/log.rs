//! Append-only per-node event log.

use crate::primitives::{Event, Message, VClock};
use crate::types::{EventKind, NodeId};

/// Ordered record of one node's events. Append order is the node's own
/// causal order; entries are never modified or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, assigning it the next sequence number.
    pub(crate) fn record(
        &mut self,
        kind: EventKind,
        node: NodeId,
        clock: VClock,
        peer: Option<NodeId>,
        message: Option<Message>,
        delivered: Option<bool>,
    ) -> &Event {
        let seq = self.events.len() as u64 + 1;
        self.events.push(Event { kind, node, seq, clock, peer, message, delivered });
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Events with a sequence number strictly greater than `seq`.
    pub fn since(&self, seq: u64) -> &[Event] {
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
