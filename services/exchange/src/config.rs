//! Exchange configuration

use std::path::PathBuf;

/// Tunables for the exchange core.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Directory for per-pair intent journals
    pub journal_dir: PathBuf,
    /// Maximum depth levels published per book side
    pub max_depth: usize,
    /// Trades retained per pair in the public tape
    pub tape_capacity: usize,
    /// Command buffer size per lane
    pub lane_buffer: usize,
}

impl ExchangeConfig {
    pub fn new(journal_dir: impl Into<PathBuf>) -> Self {
        Self {
            journal_dir: journal_dir.into(),
            max_depth: 100,
            tape_capacity: 1_000,
            lane_buffer: 256,
        }
    }
}
