//! Read-only serving layer: an immutable context wrapping the trained
//! pipeline artifact plus the injected insight generator.

pub mod explain;

use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineMetadata, Prediction};
use crate::records::RawRecord;
use explain::{InsightGenerator, DEFAULT_FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// A booking as submitted to the prediction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingInput {
    pub branch: String,
    pub booking_month: String,
    pub arrival_month: String,
    pub arrival_day: i64,
    pub checkout_month: String,
    pub checkout_day: i64,
    pub country: String,
    pub first_time: String,
    pub room: String,
    pub price: f64,
    pub platform: String,
    pub num_adults: i64,
    pub num_children: f64,
}

impl BookingInput {
    /// Lower the typed input into the loose record format the cleaning
    /// stage expects.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        raw.set("branch", json!(self.branch));
        raw.set("booking_month", json!(self.booking_month));
        raw.set("arrival_month", json!(self.arrival_month));
        raw.set("arrival_day", json!(self.arrival_day));
        raw.set("checkout_month", json!(self.checkout_month));
        raw.set("checkout_day", json!(self.checkout_day));
        raw.set("country", json!(self.country));
        raw.set("first_time", json!(self.first_time));
        raw.set("room", json!(self.room));
        raw.set("price", json!(self.price));
        raw.set("platform", json!(self.platform));
        raw.set("num_adults", json!(self.num_adults));
        raw.set("num_children", json!(self.num_children));
        raw
    }
}

/// Immutable state shared across request handlers. The pipeline is
/// loaded once at startup; nothing mutates it afterwards.
#[derive(Clone)]
pub struct ServingContext {
    pipeline: Arc<Pipeline>,
    insights: Arc<dyn InsightGenerator>,
}

impl ServingContext {
    pub fn new(pipeline: Pipeline, insights: Arc<dyn InsightGenerator>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            insights,
        }
    }

    /// Load the pipeline artifact, failing fast when it is missing so
    /// the server never comes up without a model.
    pub fn from_artifact(path: &Path, insights: Arc<dyn InsightGenerator>) -> Result<Self> {
        let pipeline = Pipeline::load(path)?;
        tracing::info!(
            path = %path.display(),
            model = %pipeline.metadata.model_name,
            threshold = pipeline.decision_threshold,
            "Pipeline artifact loaded"
        );
        Ok(Self::new(pipeline, insights))
    }

    pub fn predict(&self, input: &BookingInput) -> Result<Prediction> {
        let prediction = self.pipeline.predict(&input.to_raw())?;
        tracing::info!(
            probability = format!("{:.4}", prediction.probability),
            threshold = prediction.threshold,
            prediction = prediction.prediction.as_str(),
            "Prediction served"
        );
        Ok(prediction)
    }

    pub fn metadata(&self) -> &PipelineMetadata {
        &self.pipeline.metadata
    }

    pub fn threshold(&self) -> f64 {
        self.pipeline.decision_threshold
    }

    /// Encoded feature names, falling back to the coarse input columns
    /// when the transform exposes none.
    pub fn feature_names(&self) -> Vec<String> {
        let names = self.pipeline.feature_names();
        if names.is_empty() {
            DEFAULT_FEATURE_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect()
        } else {
            names
        }
    }

    /// Interpret the model's feature set through the injected generator.
    pub fn analysis(&self) -> Result<String> {
        self.insights.interpret(&self.feature_names())
    }
}
