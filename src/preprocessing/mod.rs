//! Data preparation stages: field cleaning, derived features, and the
//! numeric column transform that feeds the classifiers.

pub mod deriver;
pub mod normalizer;
pub mod transform;

pub use deriver::{derive, derive_batch};
pub use normalizer::Normalizer;
pub use transform::ColumnTransform;
