use crate::error::{AppError, Result};
use crate::training::classifier::CandidateSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Data and artifact paths
    pub paths: PathsConfig,

    /// Training configuration
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: NOSHOW_)
            .add_source(
                config::Environment::with_prefix("NOSHOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Raw training data (CSV with a header row)
    #[serde(default = "default_data_raw")]
    pub data_raw: PathBuf,

    /// Where the trained pipeline artifact is written and served from
    #[serde(default = "default_model_output")]
    pub model_output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of labeled data held out for threshold calibration
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Number of cross-validation folds
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    /// Schema columns excluded from the feature matrix
    #[serde(default)]
    pub drop_columns: Vec<String>,

    /// Candidate models, in declaration order. Order breaks score ties.
    #[serde(default)]
    pub candidates: Vec<CandidateSpec>,
}

impl TrainingConfig {
    /// Check the invariants the trainer relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(AppError::Configuration(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(AppError::Configuration(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if !self.candidates.iter().any(|c| c.enabled) {
            return Err(AppError::Configuration(
                "at least one training candidate must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_data_raw() -> PathBuf {
    PathBuf::from("data/bookings.csv")
}

fn default_model_output() -> PathBuf {
    PathBuf::from("artifacts/pipeline.bin")
}

fn default_test_size() -> f64 {
    0.2
}

fn default_cv_folds() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::classifier::{CandidateParams, ClassifierFamily};

    fn candidate(enabled: bool) -> CandidateSpec {
        CandidateSpec {
            name: "rf".to_string(),
            enabled,
            family: ClassifierFamily::Rf,
            params: CandidateParams::default(),
        }
    }

    #[test]
    fn test_embedded_default_config_parses() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 8000);
        assert!(config.training.validate().is_ok());
        assert_eq!(config.training.cv_folds, 5);
        // Candidate order is the tie-break order.
        assert_eq!(config.training.candidates[0].family, ClassifierFamily::Rf);
    }

    #[test]
    fn test_validate_rejects_bad_test_size() {
        let training = TrainingConfig {
            test_size: 1.5,
            cv_folds: 5,
            drop_columns: vec![],
            candidates: vec![candidate(true)],
        };
        assert!(training.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_single_fold() {
        let training = TrainingConfig {
            test_size: 0.2,
            cv_folds: 1,
            drop_columns: vec![],
            candidates: vec![candidate(true)],
        };
        assert!(training.validate().is_err());
    }

    #[test]
    fn test_validate_needs_enabled_candidate() {
        let training = TrainingConfig {
            test_size: 0.2,
            cv_folds: 5,
            drop_columns: vec![],
            candidates: vec![candidate(false)],
        };
        assert!(training.validate().is_err());
    }
}
