// Shared scalar types that are not themselves clock primitives.
// `VClock`, `Message` and `Event` live in `src/primitives.rs`.

use std::fmt;

/// Index of a simulated process, `0..N-1`.
///
/// Ids are 0-based everywhere in the API. Human-facing output labels them
/// 1-based (`P1`, `P2`, ...) via [`NodeLabel`].
pub type NodeId = usize;

/// Kind of an entry in a node's event log.
/// The `u8` tag is what crosses a transport boundary; this enum is the
/// source of truth for its values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventKind {
    /// Purely internal step; only the own coordinate advances.
    Local = 0,
    /// A message left this node carrying the post-increment clock.
    Send = 1,
    /// A message was merged into this node's clock.
    Receive = 2,
}

impl EventKind {
    /// Short name used in rendered log lines.
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Local => "Local",
            EventKind::Send => "Send",
            EventKind::Receive => "Rec",
        }
    }
}

impl TryFrom<u8> for EventKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventKind::Local),
            1 => Ok(EventKind::Send),
            2 => Ok(EventKind::Receive),
            _ => Err(format!("Invalid EventKind tag: {}", value)),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display wrapper rendering a [`NodeId`] as its 1-based process label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLabel(pub NodeId);

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_tag_roundtrip() {
        for kind in [EventKind::Local, EventKind::Send, EventKind::Receive] {
            assert_eq!(EventKind::try_from(kind as u8), Ok(kind));
        }
        assert!(EventKind::try_from(3).is_err(), "Unknown tag must be rejected");
    }

    #[test]
    fn test_node_label_is_one_based() {
        assert_eq!(NodeLabel(0).to_string(), "P1");
        assert_eq!(NodeLabel(4).to_string(), "P5");
    }
}
