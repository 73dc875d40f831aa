//! Verbosity-to-log-level wiring. See `SPEC_FULL.md` §8.
//!
//! Grounded on `examples/original_source/src/Status.cpp`'s verbosity-gated logging effect,
//! re-expressed via `log`/`env_logger`, both already this codebase's dependencies.

use log::LevelFilter;

/// Maps the CLI's `0..3` verbosity scale onto a `log::LevelFilter`.
#[must_use]
pub fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Initialises the process-wide logger. Must be called once, before constructing `InputData`.
pub fn init(verbosity: u8) {
    env_logger::Builder::new().filter_level(level_filter(verbosity)).format_timestamp(None).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbosity_scale() {
        assert_eq!(level_filter(0), LevelFilter::Off);
        assert_eq!(level_filter(1), LevelFilter::Warn);
        assert_eq!(level_filter(2), LevelFilter::Info);
        assert_eq!(level_filter(3), LevelFilter::Debug);
        assert_eq!(level_filter(255), LevelFilter::Debug);
    }
}
