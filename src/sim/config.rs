//! Configuration types for a simulation session.

use std::time::Duration;

use crate::error::{ClockError, ClockResult};

/// Smallest session that can exchange a message.
pub const MIN_PROCESS_COUNT: usize = 2;

/// Configuration for a simulation session.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of simulated processes, N.
    pub process_count: usize,

    /// How long a worker waits on an empty inbox before re-checking for shutdown.
    pub receive_poll_ms: u64,

    /// Worker threads are named `{prefix}-{node}`.
    pub worker_thread_prefix: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            process_count: 3,
            receive_poll_ms: 50,
            worker_thread_prefix: "node".into(),
        }
    }
}

impl SimConfig {
    /// Create a configuration for `process_count` processes.
    pub fn new(process_count: usize) -> Self {
        Self {
            process_count,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ClockResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the worker receive poll interval.
    pub fn with_receive_poll(mut self, poll: Duration) -> Self {
        self.receive_poll_ms = u64::try_from(poll.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the worker thread name prefix.
    pub fn with_worker_thread_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.worker_thread_prefix = prefix.into();
        self
    }

    pub fn receive_poll(&self) -> Duration {
        Duration::from_millis(self.receive_poll_ms)
    }

    pub fn validate(&self) -> ClockResult<()> {
        if self.process_count < MIN_PROCESS_COUNT {
            return Err(ClockError::InvalidProcessCount(self.process_count));
        }
        if self.receive_poll_ms == 0 {
            return Err(ClockError::Config("receive_poll_ms must be positive".into()));
        }
        Ok(())
    }
}
