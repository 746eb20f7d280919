use crate::config::TrainingConfig;
use crate::error::{AppError, Result};
use crate::pipeline::{Pipeline, PipelineMetadata};
use crate::preprocessing::{derive_batch, ColumnTransform, Normalizer};
use crate::records::{RawRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use crate::training::calibration::{calibrate_threshold, DEFAULT_THRESHOLD};
use crate::training::classifier::fit_candidate;
use crate::training::metrics::f1_score;
use crate::training::selection::{select_candidate, CandidateScore};

/// Result of a full training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub pipeline: Pipeline,
    pub scores: Vec<CandidateScore>,
    pub test_f1: f64,
}

/// Orchestrates one training run: clean, derive, split, select a
/// candidate by cross-validation, refit on the training split, and
/// calibrate the decision threshold on the held-out split.
pub struct TrainingRun {
    config: TrainingConfig,
}

impl TrainingRun {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, raw: &[RawRecord]) -> Result<TrainingOutcome> {
        self.config.validate()?;

        let (normalizer, cleaned) = Normalizer::fit_clean(raw);

        // Records without a usable label are dropped before training.
        let labeled: Vec<_> = cleaned
            .into_iter()
            .filter(|record| record.label.is_some())
            .collect();
        if labeled.is_empty() {
            return Err(AppError::Data(
                "training data contains no labeled records".to_string(),
            ));
        }
        tracing::info!(labeled = labeled.len(), total = raw.len(), "Cleaned training data");

        let labels: Vec<u8> = labeled
            .iter()
            .filter_map(|record| record.label)
            .collect();
        let features = derive_batch(labeled);

        let numeric = self.keep_columns(NUMERIC_COLUMNS);
        let categorical = self.keep_columns(CATEGORICAL_COLUMNS);

        let n = features.len();
        let n_test = (n as f64 * self.config.test_size).round() as usize;
        let n_train = n - n_test;
        if n_train == 0 {
            return Err(AppError::Training(
                "test split leaves no training data".to_string(),
            ));
        }
        let (train_records, test_records) = features.split_at(n_train);
        let (train_labels, test_labels) = labels.split_at(n_train);

        let selection = select_candidate(
            &self.config.candidates,
            train_records,
            train_labels,
            &numeric,
            &categorical,
            self.config.cv_folds,
        )?;
        tracing::info!(
            model = %selection.best.name,
            cv_f1 = format!("{:.4}", selection.best_score),
            "Recommended model"
        );

        let mut transform = ColumnTransform::new(&numeric, &categorical)?;
        let x_train = transform.fit_apply(train_records)?;
        let classifier = fit_candidate(&selection.best, &x_train, train_labels)?;

        let (decision_threshold, test_f1) = if test_records.is_empty() {
            tracing::warn!("Empty test split, keeping default threshold");
            (DEFAULT_THRESHOLD, 0.0)
        } else {
            let x_test = transform.apply(test_records)?;
            match classifier.probabilities(&x_test)? {
                Some(probabilities) => {
                    let report = calibrate_threshold(&probabilities, test_labels);
                    tracing::info!(
                        threshold = format!("{:.2}", report.threshold),
                        test_f1 = format!("{:.4}", report.f1),
                        "Calibrated decision threshold"
                    );
                    (report.threshold, report.f1)
                }
                None => {
                    // Hard-label families skip calibration.
                    let predicted = classifier.predict(&x_test)?;
                    let test_f1 = f1_score(test_labels, &predicted);
                    tracing::info!(
                        threshold = format!("{:.2}", DEFAULT_THRESHOLD),
                        test_f1 = format!("{:.4}", test_f1),
                        "Model emits hard labels, using default threshold"
                    );
                    (DEFAULT_THRESHOLD, test_f1)
                }
            }
        };

        let pipeline = Pipeline {
            normalizer,
            transform,
            classifier,
            decision_threshold,
            metadata: PipelineMetadata {
                model_name: selection.best.name.clone(),
                cv_f1: selection.best_score,
                test_f1,
                trained_at: chrono::Utc::now(),
                n_training_samples: n_train,
            },
        };

        Ok(TrainingOutcome {
            pipeline,
            scores: selection.scores,
            test_f1,
        })
    }

    fn keep_columns(&self, schema: &[&str]) -> Vec<String> {
        schema
            .iter()
            .filter(|column| !self.config.drop_columns.iter().any(|d| d == *column))
            .map(|column| column.to_string())
            .collect()
    }
}
