//!
//! Per-process clock state machine: local, send and receive events.
//!
//! A `ClockNode` owns exactly one vector clock and one event log. Every
//! operation computes the next clock on a copy and commits it only once all
//! checks have passed, so a rejected operation leaves both untouched.

use crate::channel::Transport;
use crate::error::{ClockError, ClockResult, ReceiveError};
use crate::node::log::EventLog;
use crate::primitives::{Event, Message, Payload, VClock};
use crate::types::{EventKind, NodeId, NodeLabel};

/// Read-only, point-in-time view of a node for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeSnapshot {
    pub node: NodeId,
    pub clock: VClock,
    pub log: EventLog,
    /// Received messages rendered as `"P{sender}: {payload}"`.
    pub inbox: Vec<String>,
}

/// One simulated process.
#[derive(Debug, Clone)]
pub struct ClockNode {
    id: NodeId,
    clock: VClock,
    log: EventLog,
    inbox: Vec<String>,
}

impl ClockNode {
    /// Creates node `id` of a `process_count`-node session with the all-zero clock.
    pub fn new(id: NodeId, process_count: usize) -> ClockResult<Self> {
        if id >= process_count {
            return Err(ClockError::UnknownNode { node: id, process_count });
        }
        Ok(ClockNode {
            id,
            clock: VClock::new(process_count),
            log: EventLog::new(),
            inbox: Vec::new(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn process_count(&self) -> usize {
        self.clock.len()
    }

    /// Snapshot of the current clock.
    pub fn current_clock(&self) -> VClock {
        self.clock.clone()
    }

    /// Every event recorded so far, in append order.
    pub fn history(&self) -> &EventLog {
        &self.log
    }

    pub fn inbox(&self) -> &[String] {
        &self.inbox
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            node: self.id,
            clock: self.clock.clone(),
            log: self.log.clone(),
            inbox: self.inbox.clone(),
        }
    }

    /// Installs `next` as the node's clock and appends the matching event.
    fn commit(
        &mut self,
        kind: EventKind,
        next: VClock,
        peer: Option<NodeId>,
        message: Option<Message>,
        delivered: Option<bool>,
    ) -> Event {
        self.clock = next.clone();
        let event = self.log.record(kind, self.id, next, peer, message, delivered).clone();
        tracing::debug!(node = self.id, kind = %kind, clock = %event.clock, seq = event.seq, "event recorded");
        event
    }

    /// Clock after one self-increment, without committing it.
    fn advanced(&self, mut clock: VClock) -> ClockResult<VClock> {
        clock.increment(self.id).map_err(|err| {
            tracing::warn!(node = self.id, error = %err, "clock cannot advance");
            err
        })?;
        Ok(clock)
    }

    /// Internal event: advances the own coordinate by one.
    pub fn local_event(&mut self) -> ClockResult<Event> {
        let next = self.advanced(self.clock.clone())?;
        Ok(self.commit(EventKind::Local, next, None, None, None))
    }

    /// Send event: advances the own coordinate, then hands a message carrying
    /// the new clock to `transport` for `destination`.
    ///
    /// An invalid destination is rejected before anything changes. A
    /// transport failure is returned after the Send event has been recorded
    /// with `delivered == Some(false)`: from this node's point of view the
    /// send already happened.
    pub fn send<T: Transport + ?Sized>(
        &mut self,
        destination: NodeId,
        payload: impl Into<Payload>,
        transport: &T,
    ) -> ClockResult<Event> {
        let process_count = self.process_count();
        if destination >= process_count || destination == self.id {
            tracing::warn!(node = self.id, destination, "invalid send destination");
            return Err(ClockError::InvalidDestination {
                node: self.id,
                destination,
                process_count,
            });
        }

        let next = self.advanced(self.clock.clone())?;
        let message = Message::new(self.id, payload.into(), next.clone());

        // The Send event records the delivery outcome.
        let outcome = transport.deliver(message.clone(), destination);
        let event = self.commit(
            EventKind::Send,
            next,
            Some(destination),
            Some(message),
            Some(outcome.is_ok()),
        );
        match outcome {
            Ok(()) => Ok(event),
            Err(err) => {
                tracing::warn!(
                    node = self.id,
                    destination,
                    error = %err,
                    "send recorded but delivery failed"
                );
                Err(err)
            }
        }
    }

    /// Receive event: coordinate-wise max with the carried clock, then one
    /// self-increment.
    pub fn receive(&mut self, message: &Message) -> ClockResult<Event> {
        if message.sender >= self.process_count() || message.sender == self.id {
            tracing::warn!(node = self.id, sender = message.sender, "rejected message");
            return Err(ClockError::InvalidSender {
                node: self.id,
                sender: message.sender,
            });
        }

        // Merge strictly before the self-increment.
        let merged = self.clock.merged(&message.clock).map_err(|err| {
            tracing::warn!(node = self.id, sender = message.sender, error = %err, "rejected message");
            err
        })?;
        let next = self.advanced(merged)?;

        self.inbox.push(format!("{}: {}", NodeLabel(message.sender), message.payload));
        Ok(self.commit(EventKind::Receive, next, Some(message.sender), Some(message.clone()), None))
    }

    /// Drains this node's queue on `transport` and receives each message in
    /// arrival order.
    ///
    /// Stops at the first failure. The returned [`ReceiveError`] carries the
    /// events committed before it and, if a message was rejected, that
    /// message: it has left the queue and is not retried. Messages behind it
    /// stay queued for the next call.
    pub fn receive_pending<T: Transport>(
        &mut self,
        transport: &T,
    ) -> Result<Vec<Event>, ReceiveError> {
        let mut applied = Vec::new();
        for next in transport.drain(self.id)? {
            let message = match next {
                Ok(message) => message,
                Err(source) => {
                    return Err(ReceiveError { applied, rejected: None, source });
                }
            };
            match self.receive(&message) {
                Ok(event) => applied.push(event),
                Err(source) => {
                    return Err(ReceiveError {
                        applied,
                        rejected: Some(message),
                        source,
                    });
                }
            }
        }
        Ok(applied)
    }
}

// Test helper for driving a node to states a normal run takes too long to reach.
#[cfg(test)]
impl ClockNode {
    pub(crate) fn set_clock_for_test(&mut self, clock: VClock) {
        self.clock = clock;
    }
}
