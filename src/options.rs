//! Resolved run configuration, built from [`crate::cli::Cli`].
//!
//! Grounded on `examples/original_source/src/Options.h`/`.cpp`'s field set and defaults.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Options {
    pub input_paths: Vec<String>,
    pub output_prefix: Option<String>,
    pub verbosity: u8,
    pub any: bool,
    pub preference_exponent: f64,
    pub timeout: Duration,
    pub cs_timeout: Duration,
    pub no_cs: bool,
    pub no_cs_simp: bool,
    pub thread_count: usize,
    pub max_neighbors: usize,
    pub greedy: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input_paths: Vec::new(),
            output_prefix: None,
            verbosity: 1,
            any: false,
            preference_exponent: 3.0,
            timeout: Duration::from_secs(60),
            cs_timeout: Duration::from_secs(3),
            no_cs: false,
            no_cs_simp: false,
            thread_count: std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1),
            max_neighbors: 12,
            greedy: false,
        }
    }
}
