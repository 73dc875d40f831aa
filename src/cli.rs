//! Command-line argument parsing and the `Cli -> Options` resolution step.
//!
//! Grounded on this codebase's own `main.rs` `Cli` derive-clap style and
//! `examples/original_source/src/Options.h`/`.cpp`'s flag set, defaults, and `parse_time` duration
//! grammar.

use std::time::Duration;

use clap::Parser;

use crate::error::InputError;
use crate::options::Options;

#[derive(Parser, Debug)]
#[command(name = "prefsolve", author, version, about = "Two-layer choice scheduling and assignment solver", long_about = None)]
pub struct Cli {
    /// Input file(s): slots.csv, choices.csv, choosers.csv, constraints.csv, in any order
    /// (identified by header). Reads from stdin if none given.
    #[arg(short, long = "input")]
    pub input: Vec<String>,

    /// Output prefix; writes `<prefix>.scheduling.csv` and `<prefix>.assignment.csv`. Prints to
    /// stdout if omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output level: 0 silent, 1 warnings, 2 info, 3 debug.
    #[arg(short, long, default_value_t = 1)]
    pub verbosity: u8,

    /// Stop at the first feasible solution instead of optimising further.
    #[arg(short, long)]
    pub any: bool,

    /// Preference exponent E used by the scoring function.
    #[arg(short = 'p', long = "pref-exp", default_value_t = 3.0)]
    pub pref_exp: f64,

    /// Overall optimisation timeout, e.g. "1h30m".
    #[arg(short, long, default_value = "60s")]
    pub timeout: String,

    /// Per-preference-level scheduling solver timeout.
    #[arg(long, default_value = "3s")]
    pub cs_timeout: String,

    /// Skip critical-set analysis entirely.
    #[arg(long)]
    pub no_cs: bool,

    /// Skip the critical-set simplification pass.
    #[arg(long)]
    pub no_cs_simp: bool,

    /// Worker thread count. Defaults to the available parallelism.
    #[arg(short = 'j', long = "threads")]
    pub threads: Option<usize>,

    /// Hill-climbing neighbours considered per iteration.
    #[arg(short = 'n', long, default_value_t = 12)]
    pub max_neighbors: usize,

    /// Disable the major (max-used-preference) score component; rank by minor sum only.
    #[arg(short, long)]
    pub greedy: bool,
}

/// Parses the `s|m|h|d|w` duration grammar used throughout the CLI (e.g. `1h30m`, `90s`).
pub fn parse_duration(value: &str) -> Result<Duration, InputError> {
    let mut seconds: u64 = 0;
    let mut current: u64 = 0;
    let mut saw_digit = false;
    for c in value.chars() {
        if c.is_ascii_digit() {
            current = current * 10 + u64::from(c as u8 - b'0');
            saw_digit = true;
        } else {
            let multiplier = match c {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 60 * 60 * 24,
                'w' => 60 * 60 * 24 * 7,
                _ => return Err(InputError::BadDuration(value.to_string())),
            };
            seconds += current * multiplier;
            current = 0;
        }
    }
    if !saw_digit && current == 0 && seconds == 0 {
        return Err(InputError::BadDuration(value.to_string()));
    }
    Ok(Duration::from_secs(seconds))
}

impl Cli {
    /// Validates and resolves the raw parsed arguments into a frozen [`Options`], per
    /// `SPEC_FULL.md` §9.
    pub fn into_options(self) -> Result<Options, InputError> {
        if self.pref_exp <= 0.0 {
            return Err(InputError::InvalidOption {
                option: "pref-exp",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_neighbors == 0 {
            return Err(InputError::InvalidOption {
                option: "max-neighbors",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(0) = self.threads {
            return Err(InputError::InvalidOption {
                option: "threads",
                message: "must be at least 1".to_string(),
            });
        }

        let thread_count = self
            .threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1));

        Ok(Options {
            input_paths: self.input,
            output_prefix: self.output,
            verbosity: self.verbosity,
            any: self.any,
            preference_exponent: self.pref_exp,
            timeout: parse_duration(&self.timeout)?,
            cs_timeout: parse_duration(&self.cs_timeout)?,
            no_cs: self.no_cs,
            no_cs_simp: self.no_cs_simp,
            thread_count,
            max_neighbors: self.max_neighbors,
            greedy: self.greedy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn parses_concatenated_units() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(60 * 60 + 30 * 60));
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(parse_duration("5x").is_err());
    }

    #[test]
    fn rejects_zero_max_neighbors() {
        let cli = Cli {
            input: vec![],
            output: None,
            verbosity: 1,
            any: false,
            pref_exp: 3.0,
            timeout: "60s".to_string(),
            cs_timeout: "3s".to_string(),
            no_cs: false,
            no_cs_simp: false,
            threads: None,
            max_neighbors: 0,
            greedy: false,
        };
        assert!(cli.into_options().is_err());
    }
}
