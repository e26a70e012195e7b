pub mod registry;
pub mod transport;

pub use registry::ChannelRegistry;
pub use transport::{Drain, Transport};
