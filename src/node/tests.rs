use crate::channel::{ChannelRegistry, Transport};
use crate::error::ClockError;
use crate::node::ClockNode;
use crate::primitives::{Message, Payload, VClock};
use crate::types::EventKind;

// --- Test Utilities ---

fn create_nodes(n: usize) -> Vec<ClockNode> {
    (0..n).map(|i| ClockNode::new(i, n).expect("valid node id")).collect()
}

fn clock(coords: &[u64]) -> VClock {
    VClock::from(coords.to_vec())
}

fn message_from(sender: usize, coords: &[u64]) -> Message {
    Message::new(sender, Payload::from("m"), clock(coords))
}

// --- Test Cases ---

#[test]
fn test_node_new() {
    let node = ClockNode::new(1, 3).unwrap();
    assert_eq!(node.id(), 1);
    assert_eq!(node.current_clock(), clock(&[0, 0, 0]), "Initial clock should be all zero");
    assert!(node.history().is_empty(), "Initial event log should be empty");
    assert!(node.inbox().is_empty());
}

#[test]
fn test_node_new_rejects_out_of_range_id() {
    assert!(matches!(
        ClockNode::new(3, 3),
        Err(ClockError::UnknownNode { node: 3, process_count: 3 })
    ));
}

#[test]
fn test_local_event_increments_own_coordinate() {
    let mut node = ClockNode::new(2, 3).unwrap();
    let first = node.local_event().unwrap();
    let second = node.local_event().unwrap();

    assert_eq!(first.clock, clock(&[0, 0, 1]));
    assert_eq!(second.clock, clock(&[0, 0, 2]));
    assert_eq!(first.kind, EventKind::Local);
    assert_eq!((first.seq, second.seq), (1, 2), "Sequence numbers should be per-node and start at 1");
    assert!(first.message.is_none() && first.peer.is_none());
}

#[test]
fn test_send_increments_and_carries_snapshot() {
    let registry = ChannelRegistry::new(3);
    let mut nodes = create_nodes(3);
    nodes[0].local_event().unwrap();

    let event = nodes[0].send(1, "hi", &registry).unwrap();
    assert_eq!(event.kind, EventKind::Send);
    assert_eq!(event.clock, clock(&[2, 0, 0]));
    assert_eq!(event.peer, Some(1));

    let queued = registry.try_recv(1).unwrap().expect("message should be queued for node 1");
    assert_eq!(queued.clock, clock(&[2, 0, 0]), "Message must carry the post-increment clock");
    assert_eq!(queued.sender, 0);
    assert_eq!(Some(&queued), event.message.as_ref(), "Send event must reference the sent message");
}

#[test]
fn test_send_to_self_is_noop() {
    let registry = ChannelRegistry::new(3);
    let mut node = ClockNode::new(1, 3).unwrap();
    let result = node.send(1, "loop", &registry);

    assert!(matches!(result, Err(ClockError::InvalidDestination { node: 1, destination: 1, .. })));
    assert_eq!(node.current_clock(), clock(&[0, 0, 0]), "Clock must be unmodified");
    assert!(node.history().is_empty(), "No event must be logged");
    assert_eq!(registry.total_pending(), 0);
}

#[test]
fn test_send_out_of_range_is_noop() {
    let registry = ChannelRegistry::new(3);
    let mut node = ClockNode::new(0, 3).unwrap();
    assert!(matches!(
        node.send(7, "far", &registry),
        Err(ClockError::InvalidDestination { destination: 7, process_count: 3, .. })
    ));
    assert_eq!(node.current_clock(), clock(&[0, 0, 0]));
}

#[test]
fn test_send_channel_unavailable_keeps_bookkeeping() {
    let registry = ChannelRegistry::new(2);
    registry.disconnect(1).unwrap();
    let mut node = ClockNode::new(0, 2).unwrap();

    let result = node.send(1, "lost", &registry);
    assert!(matches!(result, Err(ClockError::ChannelUnavailable { destination: 1, .. })));
    assert_eq!(node.current_clock(), clock(&[1, 0]), "Send increment is not rolled back");
    assert_eq!(node.history().len(), 1);
    assert_eq!(node.history().last().map(|e| e.kind), Some(EventKind::Send));
    let event = node.history().last().unwrap();
    assert_eq!(event.delivered, Some(false), "The log must show the failed delivery");
    assert_eq!(event.to_string(), "Send(P2, \"lost\"): VC=[1,0] FAILED");
}

#[test]
fn test_delivered_send_is_marked() {
    let registry = ChannelRegistry::new(2);
    let mut nodes = create_nodes(2);
    let sent = nodes[0].send(1, "ok", &registry).unwrap();
    assert_eq!(sent.delivered, Some(true));
    assert_eq!(nodes[0].local_event().unwrap().delivered, None);
}

#[test]
fn test_receive_merges_then_increments() {
    let mut node = ClockNode::new(1, 3).unwrap();
    node.local_event().unwrap(); // [0,1,0]

    let event = node.receive(&message_from(0, &[4, 0, 2])).unwrap();
    assert_eq!(event.clock, clock(&[4, 2, 2]));
    assert_eq!(event.kind, EventKind::Receive);
    assert_eq!(event.peer, Some(0));
}

#[test]
fn test_receive_increments_even_when_merge_raised_own_coordinate() {
    // A carried own coordinate ahead of the local one is impossible in a
    // correct run, but the self-increment still applies on top of the max.
    let mut node = ClockNode::new(1, 2).unwrap();
    let event = node.receive(&message_from(0, &[1, 5])).unwrap();
    assert_eq!(event.clock, clock(&[1, 6]));
}

#[test]
fn test_receive_rejects_wrong_clock_size() {
    let mut node = ClockNode::new(0, 3).unwrap();
    let result = node.receive(&message_from(1, &[1, 1]));
    assert_eq!(result, Err(ClockError::ClockSizeMismatch { expected: 3, found: 2 }));
    assert_eq!(node.current_clock(), clock(&[0, 0, 0]));
    assert!(node.history().is_empty());
    assert!(node.inbox().is_empty());
}

#[test]
fn test_receive_rejects_invalid_sender() {
    let mut node = ClockNode::new(0, 3).unwrap();
    assert_eq!(
        node.receive(&message_from(0, &[1, 0, 0])),
        Err(ClockError::InvalidSender { node: 0, sender: 0 })
    );
    assert_eq!(
        node.receive(&message_from(9, &[1, 0, 0])),
        Err(ClockError::InvalidSender { node: 0, sender: 9 })
    );
    assert!(node.history().is_empty());
}

#[test]
fn test_clock_overflow_is_rejected() {
    let mut node = ClockNode::new(0, 2).unwrap();
    node.set_clock_for_test(clock(&[u64::MAX - 1, 0]));

    node.local_event().expect("One step before overflow should succeed");
    assert_eq!(node.current_clock().get(0), Some(u64::MAX));

    assert_eq!(node.local_event(), Err(ClockError::ClockOverflow { node: 0 }));
    assert_eq!(node.history().len(), 1, "Overflowing event must not be logged");
}

#[test]
fn test_inbox_records_display_lines() {
    let registry = ChannelRegistry::new(2);
    let mut nodes = create_nodes(2);
    nodes[0].send(1, "hello", &registry).unwrap();
    nodes[1].receive_pending(&registry).unwrap();

    assert_eq!(nodes[1].inbox(), ["P1: hello".to_string()]);
    let line = nodes[1].history().last().unwrap().to_string();
    assert_eq!(line, "Rec(P1, \"hello\"): VC=[1,1]");
}

#[test]
fn test_receive_pending_applies_in_arrival_order() {
    let registry = ChannelRegistry::new(3);
    let mut nodes = create_nodes(3);
    nodes[0].send(2, "a", &registry).unwrap(); // [1,0,0]
    nodes[1].send(2, "b", &registry).unwrap(); // [0,1,0]
    nodes[0].send(2, "c", &registry).unwrap(); // [2,0,0]

    let applied = nodes[2].receive_pending(&registry).unwrap();
    let clocks: Vec<VClock> = applied.iter().map(|e| e.clock.clone()).collect();
    assert_eq!(clocks, vec![clock(&[1, 0, 1]), clock(&[1, 1, 2]), clock(&[2, 1, 3])]);
    assert_eq!(registry.pending(2), Ok(0));
}

#[test]
fn test_send_and_receive_share_message_id() {
    let registry = ChannelRegistry::new(2);
    let mut nodes = create_nodes(2);
    let sent = nodes[0].send(1, "x", &registry).unwrap();
    let received = nodes[1].receive_pending(&registry).unwrap();

    let sent_id = sent.message.map(|m| m.id);
    let received_id = received[0].message.as_ref().map(|m| m.id);
    assert!(sent_id.is_some());
    assert_eq!(sent_id, received_id);
}

#[test]
fn test_snapshot_is_point_in_time() {
    let mut node = ClockNode::new(0, 2).unwrap();
    node.local_event().unwrap();
    let snap = node.snapshot();
    node.local_event().unwrap();

    assert_eq!(snap.clock, clock(&[1, 0]));
    assert_eq!(snap.log.len(), 1, "Snapshot must not observe later events");
}

#[test]
fn test_receive_pending_stops_at_rejected_message() {
    let registry = ChannelRegistry::new(3);
    let mut nodes = create_nodes(3);
    registry.deliver(message_from(0, &[1, 0, 0]), 2).unwrap();
    let bad = message_from(1, &[1, 0]);
    registry.deliver(bad.clone(), 2).unwrap();
    registry.deliver(message_from(0, &[2, 0, 0]), 2).unwrap();

    let err = nodes[2].receive_pending(&registry).unwrap_err();
    assert_eq!(err.source, ClockError::ClockSizeMismatch { expected: 3, found: 2 });
    assert_eq!(err.applied.len(), 1, "Events committed before the failure are returned");
    assert_eq!(err.applied[0].clock, clock(&[1, 0, 1]));
    assert_eq!(err.rejected, Some(bad), "The rejected message is handed back, not retried");
    assert_eq!(nodes[2].history().len(), 1);
    assert_eq!(registry.pending(2), Ok(1), "Messages behind the rejected one stay queued");

    let rest = nodes[2].receive_pending(&registry).unwrap();
    assert_eq!(rest[0].clock, clock(&[2, 0, 2]));
}

#[test]
fn test_receive_pending_on_closed_registry() {
    let registry = ChannelRegistry::new(2);
    let mut node = ClockNode::new(1, 2).unwrap();
    registry.close();

    let err = node.receive_pending(&registry).unwrap_err();
    assert!(matches!(err.source, ClockError::ChannelUnavailable { destination: 1, .. }));
    assert!(err.applied.is_empty());
    assert!(err.rejected.is_none());
}
