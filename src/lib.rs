#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! vclock-core models causal ordering among N independent processes with
//! vector clocks.
//!
//! Each process is a [`node::ClockNode`] owning one clock and one append-only
//! event log. Nodes exchange [`Message`]s only through a [`channel::Transport`]
//! (in memory: [`channel::ChannelRegistry`]), and the [`sim::Simulation`]
//! driver exposes the control surface and snapshots a presentation layer
//! polls.
//!
//! ```
//! use vclock_core::{sim::Simulation, VClock};
//!
//! let sim = Simulation::new(3)?;
//! sim.trigger_local_event(0)?;
//! sim.trigger_send(0, 1, "hi")?;
//! let update = sim.poll_and_apply_receives(1)?;
//! assert_eq!(update.clock, VClock::from(vec![2, 1, 0]));
//! # Ok::<(), vclock_core::error::ClockError>(())
//! ```

// Shared scalar types (NodeId, EventKind).
pub mod types;

// Clock, message and event primitives.
pub mod primitives;

// Re-export all core primitives for easier access at the crate root.
pub use primitives::*;

// Slice-level vector clock arithmetic.
pub mod time;

pub mod error;

// Per-process state machine and event log.
pub mod node;

// Transport abstraction and the in-memory registry.
pub mod channel;

// Session driver, configuration and worker threads.
pub mod sim;
