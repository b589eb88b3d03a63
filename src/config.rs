//! Session configuration.
use std::time::Duration;

use crate::rpc::DEFAULT_PORT;

/// Rows requested per fetch call and accumulated per flush.
pub const DEFAULT_FETCH_BATCH_SIZE: usize = 1024;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Print progress messages (query text, timings, connect notices).
    pub verbose: bool,
    pub fetch_batch_size: usize,
    pub default_port: u16,
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            fetch_batch_size: DEFAULT_FETCH_BATCH_SIZE,
            default_port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}
