#![no_main]

// Harness: node_receive_merge - arbitrary messages applied to one node.
// A receive either fails without touching the node or merges and advances
// the own coordinate by exactly one.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vclock_core::{node::ClockNode, Message, Payload, VClock};

#[derive(Arbitrary, Debug, Clone)]
struct Frame {
    process_count: u8,
    receiver: u8,
    sender: u8,
    coords: Vec<u64>,
    payload: Vec<u8>,
}

fuzz_target!(|frames: Vec<Frame>| {
    let Some(first) = frames.first() else { return };
    let n = (first.process_count as usize % 8) + 2;
    let Ok(mut node) = ClockNode::new(first.receiver as usize % n, n) else {
        return;
    };

    for frame in frames {
        let before = node.current_clock();
        let logged = node.history().len();
        let msg = Message::new(
            frame.sender as usize,
            Payload::from(frame.payload),
            VClock::from(frame.coords),
        );
        match node.receive(&msg) {
            Ok(event) => {
                let expected = before.merged(&msg.clock).unwrap();
                let own = node.id();
                for k in 0..n {
                    let want = expected.get(k).unwrap() + u64::from(k == own);
                    assert_eq!(event.clock.get(k), Some(want));
                }
                assert_eq!(node.history().len(), logged + 1);
            }
            Err(_) => {
                assert_eq!(node.current_clock(), before);
                assert_eq!(node.history().len(), logged);
            }
        }
    }
});
