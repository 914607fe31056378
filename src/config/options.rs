//! Options accepted by the fused analysis

use crate::error::{Result, TamperError};
use serde::{Deserialize, Serialize};

/// Default edge-variance level above which edges count as inconsistent
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.7;

/// Edge variance above this raises the threat level, whatever `edge_threshold` is
pub const THREAT_EDGE_THRESHOLD: f64 = 0.7;

/// Clarity below this is reported as low visual clarity
pub const LOW_CLARITY_THRESHOLD: f64 = 0.5;

/// Spectrum score below this raises the threat level
pub const LOW_SPECTRUM_THRESHOLD: f64 = 0.5;

/// Per-call analysis options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Run the FFT band analysis; when false a neutral result is substituted
    pub perform_spectral_analysis: bool,
    /// Edge variance above this triggers "high edge inconsistency"
    pub edge_threshold: f64,
}

impl AnalysisOptions {
    /// Reject thresholds outside [0, 1]
    ///
    /// Edge variance is normalized to [0, 1], so any other threshold is
    /// either always or never triggered.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.edge_threshold) {
            return Err(TamperError::ConfigError(format!(
                "edge threshold must be within [0, 1], got {}",
                self.edge_threshold
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            perform_spectral_analysis: true,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert!(options.perform_spectral_analysis);
        assert_eq!(options.edge_threshold, 0.7);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let options = AnalysisOptions {
                edge_threshold: bad,
                ..Default::default()
            };
            assert!(matches!(options.validate(), Err(TamperError::ConfigError(_))));
        }
    }
}
