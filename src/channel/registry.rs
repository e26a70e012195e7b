//! In-memory `Transport`: one inbound queue per node.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::channel::transport::Transport;
use crate::error::{ClockError, ClockResult};
use crate::primitives::Message;
use crate::types::NodeId;

#[derive(Debug)]
struct Inbox {
    queue: Mutex<VecDeque<Message>>,
    ready: Condvar,
    connected: AtomicBool,
}

impl Inbox {
    fn new() -> Self {
        Inbox {
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            connected: AtomicBool::new(true),
        }
    }
}

/// Reliable, asynchronous unicast fabric shared by every node of a session.
///
/// A single arrival-ordered queue per destination gives FIFO order for every
/// (sender, destination) pair. Nothing is promised about the interleaving of
/// different senders.
#[derive(Debug)]
pub struct ChannelRegistry {
    inboxes: Vec<Inbox>,
    closed: AtomicBool,
}

impl ChannelRegistry {
    pub fn new(process_count: usize) -> Self {
        ChannelRegistry {
            inboxes: (0..process_count).map(|_| Inbox::new()).collect(),
            closed: AtomicBool::new(false),
        }
    }

    fn inbox(&self, node: NodeId) -> ClockResult<&Inbox> {
        self.inboxes.get(node).ok_or(ClockError::UnknownNode {
            node,
            process_count: self.inboxes.len(),
        })
    }

    fn closed_error(destination: NodeId) -> ClockError {
        ClockError::ChannelUnavailable {
            destination,
            reason: "channel registry is closed".into(),
        }
    }

    /// Makes deliveries to `node` fail until `reconnect`. Already queued
    /// messages stay queued.
    pub fn disconnect(&self, node: NodeId) -> ClockResult<()> {
        self.inbox(node)?.connected.store(false, Ordering::Release);
        tracing::info!(node, "endpoint disconnected");
        Ok(())
    }

    pub fn reconnect(&self, node: NodeId) -> ClockResult<()> {
        self.inbox(node)?.connected.store(true, Ordering::Release);
        tracing::info!(node, "endpoint reconnected");
        Ok(())
    }

    pub fn is_connected(&self, node: NodeId) -> ClockResult<bool> {
        Ok(self.inbox(node)?.connected.load(Ordering::Acquire))
    }

    /// Shuts the fabric down. In-flight messages are discarded and blocked
    /// receivers wake up.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut dropped = 0;
        for inbox in &self.inboxes {
            let mut queue = inbox.queue.lock();
            dropped += queue.len();
            queue.clear();
            inbox.ready.notify_all();
        }
        tracing::info!(dropped, "channel registry closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Messages queued across all nodes.
    pub fn total_pending(&self) -> usize {
        self.inboxes.iter().map(|inbox| inbox.queue.lock().len()).sum()
    }
}

impl Transport for ChannelRegistry {
    fn process_count(&self) -> usize {
        self.inboxes.len()
    }

    fn deliver(&self, message: Message, destination: NodeId) -> ClockResult<()> {
        let process_count = self.inboxes.len();
        if destination >= process_count || destination == message.sender {
            return Err(ClockError::InvalidDestination {
                node: message.sender,
                destination,
                process_count,
            });
        }
        let inbox = &self.inboxes[destination];
        if !inbox.connected.load(Ordering::Acquire) {
            tracing::warn!(sender = message.sender, destination, "delivery to disconnected endpoint");
            return Err(ClockError::ChannelUnavailable {
                destination,
                reason: "endpoint disconnected".into(),
            });
        }

        let mut queue = inbox.queue.lock();
        // Checked under the queue lock so `close` cannot race a late push.
        if self.is_closed() {
            return Err(Self::closed_error(destination));
        }
        tracing::debug!(
            sender = message.sender,
            destination,
            clock = %message.clock,
            "message queued"
        );
        queue.push_back(message);
        inbox.ready.notify_one();
        Ok(())
    }

    fn try_recv(&self, node: NodeId) -> ClockResult<Option<Message>> {
        let inbox = self.inbox(node)?;
        if self.is_closed() {
            return Err(Self::closed_error(node));
        }
        Ok(inbox.queue.lock().pop_front())
    }

    fn recv_timeout(&self, node: NodeId, timeout: Duration) -> ClockResult<Option<Message>> {
        let inbox = self.inbox(node)?;
        // `None` when the timeout overflows `Instant`: wait without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        let mut queue = inbox.queue.lock();
        loop {
            if self.is_closed() {
                return Err(Self::closed_error(node));
            }
            if let Some(message) = queue.pop_front() {
                return Ok(Some(message));
            }
            match deadline {
                Some(deadline) => {
                    if inbox.ready.wait_until(&mut queue, deadline).timed_out() {
                        return Ok(queue.pop_front());
                    }
                }
                None => inbox.ready.wait(&mut queue),
            }
        }
    }

    fn pending(&self, node: NodeId) -> ClockResult<usize> {
        Ok(self.inbox(node)?.queue.lock().len())
    }
}
