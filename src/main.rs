//! tamperscan CLI entry point

use clap::Parser;
use std::process::ExitCode;
use tamperscan::config::{Cli, Settings};
use tamperscan::pipeline;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let settings = Settings::from_cli(&cli);

    if let Err(e) = validate_inputs(&cli, &settings) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match pipeline::run(&settings) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} successful, {} failed, {} skipped (of {} total)",
                result.successful, result.failed, result.skipped, result.total_files
            );

            if result.failed > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli, settings: &Settings) -> Result<(), String> {
    if !cli.input.exists() {
        return Err(format!(
            "Input path does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    tamperscan -i ./evidence -o ./report\n    tamperscan -i ./photo.jpg -o ./report --edge-maps",
            cli.input.display()
        ));
    }

    // The output directory itself is created on demand, its parent must exist
    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    settings.analysis.validate().map_err(|e| e.to_string())
}
