//! Model training: candidate classifier families, cross-validated
//! selection, decision-threshold calibration, and the run orchestrator.

pub mod calibration;
pub mod classifier;
pub mod metrics;
pub mod selection;
pub mod trainer;

pub use calibration::{calibrate_threshold, ThresholdReport, DEFAULT_THRESHOLD};
pub use classifier::{CandidateParams, CandidateSpec, ClassifierFamily, FittedClassifier};
pub use metrics::{f1_score, BinaryConfusion};
pub use selection::{select_candidate, CandidateScore, Selection};
pub use trainer::{TrainingOutcome, TrainingRun};
