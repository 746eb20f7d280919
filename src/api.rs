use crate::error::Result;
use crate::pipeline::Prediction;
use crate::serving::{BookingInput, ServingContext};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the HTTP router over an immutable serving context.
pub fn build_router(context: ServingContext) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/predict", post(predict))
        .route("/api/analysis", get(analysis))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(context)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    model_loaded: bool,
    model_name: String,
    threshold: f64,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    report: String,
}

/// Service status. The server refuses to start without a model, so
/// `model_loaded` is true whenever this handler answers.
async fn status(State(context): State<ServingContext>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "active",
        model_loaded: true,
        model_name: context.metadata().model_name.clone(),
        threshold: context.threshold(),
    })
}

/// Score one booking.
async fn predict(
    State(context): State<ServingContext>,
    Json(input): Json<BookingInput>,
) -> Result<Json<Prediction>> {
    Ok(Json(context.predict(&input)?))
}

/// Interpret the model's feature set. Generator failures degrade to an
/// error report rather than failing the request.
async fn analysis(State(context): State<ServingContext>) -> Json<AnalysisResponse> {
    let report = match context.analysis() {
        Ok(report) => report,
        Err(e) => format!("Analysis failed: {e}"),
    };
    Json(AnalysisResponse { report })
}
