use crate::error::{AppError, Result};
use crate::preprocessing::{derive, ColumnTransform, Normalizer};
use crate::records::RawRecord;
use crate::training::classifier::FittedClassifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata frozen into the artifact at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMetadata {
    /// Name of the winning candidate from the training configuration.
    pub model_name: String,
    /// Mean cross-validation F1 of the winning candidate.
    pub cv_f1: f64,
    /// F1 on the held-out split at the calibrated threshold.
    pub test_f1: f64,
    pub trained_at: DateTime<Utc>,
    pub n_training_samples: usize,
}

/// Predicted outcome for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "No-Show")]
    NoShow,
    #[serde(rename = "Check-In")]
    CheckIn,
}

impl Outcome {
    /// Decision rule: no-show when the probability reaches the threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Outcome::NoShow
        } else {
            Outcome::CheckIn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NoShow => "No-Show",
            Outcome::CheckIn => "Check-In",
        }
    }
}

/// A single prediction as returned to API callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: Outcome,
    pub probability: f64,
    pub threshold: f64,
}

/// The complete fitted pipeline: cleaning statistics, column transform,
/// classifier, and calibrated decision threshold. Everything a serving
/// process needs, serialized as one bincode artifact.
#[derive(Debug, Serialize, Deserialize)]
pub struct Pipeline {
    pub normalizer: Normalizer,
    pub transform: ColumnTransform,
    pub classifier: FittedClassifier,
    pub decision_threshold: f64,
    pub metadata: PipelineMetadata,
}

impl Pipeline {
    /// Run a raw record through cleaning, derivation, encoding, and the
    /// classifier. Families without probability output fall back to the
    /// hard label rendered as 1.0 or 0.0.
    pub fn predict(&self, raw: &RawRecord) -> Result<Prediction> {
        let features = derive(self.normalizer.clean(raw));
        let matrix = self.transform.apply(std::slice::from_ref(&features))?;

        let probability = match self.classifier.probabilities(&matrix)? {
            Some(probabilities) => probabilities[0],
            None => {
                let predicted = self.classifier.predict(&matrix)?;
                if predicted[0] == 1 {
                    1.0
                } else {
                    0.0
                }
            }
        };

        Ok(Prediction {
            prediction: Outcome::from_probability(probability, self.decision_threshold),
            probability,
            threshold: self.decision_threshold,
        })
    }

    /// Names of the encoded feature columns.
    pub fn feature_names(&self) -> Vec<String> {
        self.transform.feature_names()
    }

    /// Serialize the pipeline to a bincode artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = bincode::serialize(self)
            .map_err(|e| AppError::Artifact(format!("serialize pipeline: {e}")))?;
        std::fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), "Pipeline artifact saved");
        Ok(())
    }

    /// Load a pipeline artifact, failing fast when it is missing or corrupt.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::Artifact(format!("read artifact {}: {e}", path.display()))
        })?;
        bincode::deserialize(&bytes)
            .map_err(|e| AppError::Artifact(format!("decode artifact {}: {e}", path.display())))
    }
}
