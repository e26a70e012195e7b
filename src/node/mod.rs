pub mod core;
pub mod log;

#[cfg(test)]
mod tests;

// Re-export the primary types so `crate::node::*` paths stay short.
pub use self::core::{ClockNode, NodeSnapshot};
pub use self::log::EventLog;
