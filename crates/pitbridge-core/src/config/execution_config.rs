//! Execution configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Partition work across keys and peripherals with rayon.
    pub parallel: bool,
    /// Smallest chunk a rayon worker takes.
    pub min_parallel_len: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            min_parallel_len: 64,
        }
    }
}
