//! Commonly used code.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Args {
    /// The `tracing` level corresponding to the verbosity flags.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        }
    }
}

/// The version of `genomeguard` package.
#[cfg(not(test))]
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// This allows us to override the version to `0.0.0` in tests.
pub fn version() -> &'static str {
    #[cfg(test)]
    return "0.0.0";
    #[cfg(not(test))]
    return VERSION;
}

/// Strip a leading `chr` from a chromosome name.
pub fn strip_chr(chrom: &str) -> &str {
    chrom.strip_prefix("chr").unwrap_or(chrom)
}

/// Percentage of `count` in `total`, guarding against an empty total.
pub fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / std::cmp::max(1, total) as f64 * 100.0
}

#[cfg(test)]
mod test {
    use clap_verbosity_flag::Verbosity;
    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("chr17", "17")]
    #[case("17", "17")]
    #[case("chrX", "X")]
    #[case("", "")]
    fn strip_chr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(super::strip_chr(input), expected);
    }

    #[rstest::rstest]
    #[case(1, 4, 25.0)]
    #[case(0, 0, 0.0)]
    #[case(3, 0, 300.0)]
    #[case(2, 2, 100.0)]
    fn percentage(#[case] count: usize, #[case] total: usize, #[case] expected: f64) {
        assert_eq!(super::percentage(count, total), expected);
    }

    #[test]
    fn tracing_level() {
        let args = super::Args {
            verbose: Verbosity::new(0, 0),
        };
        assert_eq!(args.tracing_level(), tracing::Level::INFO);

        let args = super::Args {
            verbose: Verbosity::new(2, 0),
        };
        assert_eq!(args.tracing_level(), tracing::Level::TRACE);
    }

    #[test]
    fn version_is_overridden_in_tests() {
        assert_eq!(super::version(), "0.0.0");
    }
}
