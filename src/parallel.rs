//! Parallel processing configuration
//!
//! Reductions over large cubes use Rayon internally; this module configures
//! the global thread pool from the CLI's `--threads` flag.

use crate::errors::{Result, TempoCubeError};
use rayon::ThreadPoolBuilder;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Configuration with an explicit thread count; `None` keeps Rayon's
    /// default.
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    /// Configuration using all available CPU cores.
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Set up the global Rayon thread pool with this configuration.
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    TempoCubeError::ThreadPoolError(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;
            println!("✅ Configured parallel processing with {} threads", num_threads);
        }
        Ok(())
    }

    /// Number of threads currently in use.
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }
}
