//! Configuration and CLI handling

pub mod cli;
pub mod options;
pub mod settings;

pub use cli::Cli;
pub use options::AnalysisOptions;
pub use settings::Settings;
