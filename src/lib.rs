//! Hotel booking no-show prediction.
//!
//! The crate covers the full model lifecycle: cleaning raw booking
//! records, deriving features, encoding them into a numeric matrix,
//! selecting a classifier by cross-validation, calibrating the decision
//! threshold, and serving predictions over HTTP from the persisted
//! pipeline artifact.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod preprocessing;
pub mod records;
pub mod serving;
pub mod training;

pub use error::{AppError, Result};
pub use pipeline::{Outcome, Pipeline, Prediction};
pub use records::{CleanRecord, FeatureRecord, RawRecord};
