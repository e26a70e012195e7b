//! Transport abstraction.
//!
//! A `Transport` moves `Message`s between node ids. The clock protocol only
//! relies on `deliver` being non-blocking and on per (sender, destination)
//! FIFO order; everything else (in-process queues, sockets, RPC) is an
//! implementation detail behind this trait.

use std::time::Duration;

use crate::error::{ClockError, ClockResult};
use crate::primitives::Message;
use crate::types::NodeId;

/// Trait implemented by message fabrics connecting the nodes of a session.
pub trait Transport: Send + Sync {
    /// Number of addressable nodes, `N`.
    fn process_count(&self) -> usize;

    /// Enqueues `message` for `destination` without waiting for it to be consumed.
    ///
    /// Fails with `InvalidDestination` if `destination` is out of range or is
    /// the message's own sender, and with `ChannelUnavailable` if the
    /// destination cannot currently be reached.
    fn deliver(&self, message: Message, destination: NodeId) -> ClockResult<()>;

    /// Removes and returns the oldest queued message for `node`, if any.
    fn try_recv(&self, node: NodeId) -> ClockResult<Option<Message>>;

    /// Like `try_recv`, but waits up to `timeout` for a message to arrive.
    /// A timeout too large to express as a deadline waits without one.
    fn recv_timeout(&self, node: NodeId, timeout: Duration) -> ClockResult<Option<Message>>;

    /// Number of messages currently queued for `node`.
    fn pending(&self, node: NodeId) -> ClockResult<usize>;

    /// Lazy, destructive iterator over `node`'s queued messages.
    fn drain(&self, node: NodeId) -> ClockResult<Drain<'_, Self>>
    where
        Self: Sized,
    {
        Drain::new(self, node)
    }
}

/// Iterator returned by [`Transport::drain`].
///
/// Each call to `next` pops one message, so messages are removed only as
/// they are consumed; dropping the iterator early leaves the rest queued.
/// Iteration ends the first time the queue is observed empty, or right after
/// yielding a transport error.
pub struct Drain<'a, T: Transport + ?Sized> {
    transport: &'a T,
    node: NodeId,
    done: bool,
}

impl<'a, T: Transport + ?Sized> Drain<'a, T> {
    pub fn new(transport: &'a T, node: NodeId) -> ClockResult<Self> {
        let process_count = transport.process_count();
        if node >= process_count {
            return Err(ClockError::UnknownNode { node, process_count });
        }
        Ok(Drain { transport, node, done: false })
    }
}

impl<T: Transport + ?Sized> Iterator for Drain<'_, T> {
    type Item = ClockResult<Message>;

    fn next(&mut self) -> Option<ClockResult<Message>> {
        if self.done {
            return None;
        }
        match self.transport.try_recv(self.node) {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                tracing::warn!(node = self.node, error = %err, "drain stopped early");
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<T: Transport + ?Sized> std::iter::FusedIterator for Drain<'_, T> {}
