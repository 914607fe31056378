//! CLI argument parsing and configuration

use super::options::DEFAULT_EDGE_THRESHOLD;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// tamperscan - Image tamper feature extraction
///
/// Scores images for tampering signals from embedded metadata, edge
/// statistics, frequency-band energy and perceptual clarity. Writes a JSON
/// report with one feature vector and explanation per image.
#[derive(Parser, Debug)]
#[command(name = "tamperscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Input path (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for the JSON report and edge maps
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Skip FFT band analysis (spectrum score reported as 0)
    #[arg(long)]
    pub no_spectral: bool,

    /// Edge variance above which edges are reported as inconsistent
    #[arg(long, value_name = "F", default_value_t = DEFAULT_EDGE_THRESHOLD)]
    pub edge_threshold: f64,

    /// Write each image's edge map as PNG under <DIR>/edges
    #[arg(long)]
    pub edge_maps: bool,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Only scan the top level of the input directory
    #[arg(long = "no-recursive", action = ArgAction::SetFalse)]
    pub recursive: bool,

    /// Re-analyze images already in the report
    #[arg(long)]
    pub force: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run - show files that would be analyzed without processing
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::parse_from(["tamperscan", "-i", "a", "-o", "b", "-vv"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        let cli = Cli::parse_from(["tamperscan", "-i", "a", "-o", "b", "-v", "-q"]);
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_recursive_by_default() {
        let cli = Cli::parse_from(["tamperscan", "-i", "a", "-o", "b"]);
        assert!(cli.recursive);
        assert_eq!(cli.edge_threshold, DEFAULT_EDGE_THRESHOLD);
    }
}
