//! Runtime configuration settings

use super::options::AnalysisOptions;
use std::path::PathBuf;

/// Runtime settings for the batch pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Options passed to every fused analysis
    pub analysis: AnalysisOptions,
    /// Encode each edge map as PNG under `<output>/edges`
    pub write_edge_maps: bool,
    /// Number of analysis worker threads
    pub analysis_threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Re-analyze images already present in the report
    pub force: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show files without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let total_cores = num_cpus::get();

        // Reserve one core for the edge-map writer when it runs
        let reserved = if cli.edge_maps { 2 } else { 1 };
        let default_threads = total_cores.saturating_sub(reserved).max(1);

        let analysis_threads = cli.threads.unwrap_or(default_threads).max(1);

        Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            analysis: AnalysisOptions {
                perform_spectral_analysis: !cli.no_spectral,
                edge_threshold: cli.edge_threshold,
            },
            write_edge_maps: cli.edge_maps,
            analysis_threads,
            recursive: cli.recursive,
            force: cli.force,
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }

    /// Path of the JSON report inside the output directory
    pub fn report_path(&self) -> PathBuf {
        self.output.join(crate::export::REPORT_FILE_NAME)
    }

    /// Directory receiving edge-map PNGs
    pub fn edges_dir(&self) -> PathBuf {
        self.output.join("edges")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            analysis: AnalysisOptions::default(),
            write_edge_maps: false,
            analysis_threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: true,
            force: false,
            show_progress: true,
            dry_run: false,
        }
    }
}
