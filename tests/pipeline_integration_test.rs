//! End-to-end tests for the full prediction pipeline: training over
//! dirty raw records, artifact persistence, and serving.

use noshow_predictor::config::TrainingConfig;
use noshow_predictor::pipeline::{Outcome, Pipeline};
use noshow_predictor::preprocessing::{derive, Normalizer};
use noshow_predictor::records::RawRecord;
use noshow_predictor::serving::explain::OfflineInsightGenerator;
use noshow_predictor::serving::{BookingInput, ServingContext};
use noshow_predictor::training::classifier::{CandidateParams, CandidateSpec, ClassifierFamily};
use noshow_predictor::training::TrainingRun;
use serde_json::json;
use std::sync::Arc;

/// Synthetic bookings with realistic dirtiness: mixed currency markers,
/// spelled-out guest counts, missing rooms, and messy month casing.
/// No-shows are expensive Suite bookings; check-ins are cheap Deluxe ones.
fn dirty_bookings(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            let label = i % 2;
            let mut raw = RawRecord::new();
            raw.set("branch", json!("Orchard"));
            raw.set("booking_month", json!(if i % 4 == 0 { "may" } else { "May" }));
            raw.set(
                "arrival_month",
                json!(if label == 1 { "june" } else { "March" }),
            );
            raw.set("arrival_day", json!("10"));
            raw.set("checkout_month", json!("June"));
            raw.set("checkout_day", json!("14"));
            raw.set("country", json!("Singapore"));
            raw.set("first_time", json!("Yes"));
            if i % 5 != 0 {
                raw.set("room", json!(if label == 1 { "Suite" } else { "Deluxe" }));
            }
            let price = if label == 1 {
                if i % 3 == 0 {
                    "USD$667".to_string() // converts to ~900
                } else {
                    "SGD$900".to_string()
                }
            } else {
                "95".to_string()
            };
            raw.set("price", json!(price));
            raw.set("platform", json!("Web"));
            raw.set("num_adults", json!(if i % 6 == 0 { "two" } else { "2" }));
            raw.set("num_children", json!("none"));
            raw.set("no_show", json!(label.to_string()));
            raw
        })
        .collect()
}

fn training_config() -> TrainingConfig {
    TrainingConfig {
        test_size: 0.2,
        cv_folds: 5,
        drop_columns: vec![
            "platform".to_string(),
            "num_children".to_string(),
            "num_adults".to_string(),
            "total_guests".to_string(),
        ],
        candidates: vec![
            CandidateSpec {
                name: "random_forest".to_string(),
                enabled: true,
                family: ClassifierFamily::Rf,
                params: CandidateParams {
                    n_trees: Some(50),
                    seed: Some(42),
                    ..CandidateParams::default()
                },
            },
            CandidateSpec {
                name: "perceptron".to_string(),
                enabled: true,
                family: ClassifierFamily::Mlp,
                params: CandidateParams::default(),
            },
            CandidateSpec {
                name: "boosted_tree".to_string(),
                enabled: true,
                family: ClassifierFamily::Xgb,
                params: CandidateParams::default(),
            },
        ],
    }
}

fn booking(room: &str, month: &str, price: f64) -> BookingInput {
    BookingInput {
        branch: "Orchard".to_string(),
        booking_month: "May".to_string(),
        arrival_month: month.to_string(),
        arrival_day: 10,
        checkout_month: "June".to_string(),
        checkout_day: 14,
        country: "Singapore".to_string(),
        first_time: "Yes".to_string(),
        room: room.to_string(),
        price,
        platform: "Web".to_string(),
        num_adults: 2,
        num_children: 0.0,
    }
}

#[test]
fn test_cleaning_and_derivation_of_dirty_record() {
    let normalizer = Normalizer::fit(&[]);
    let mut raw = RawRecord::new();
    raw.set("price", json!("150 USD"));
    raw.set("room", json!("Deluxe"));
    raw.set("num_adults", json!("two"));
    raw.set("num_children", json!("zero"));
    raw.set("arrival_month", json!("december"));
    raw.set("booking_month", json!("june"));

    let features = derive(normalizer.clean(&raw));
    assert!((features.record.price - 202.5).abs() < 1e-9);
    assert_eq!(features.record.num_adults, 2.0);
    assert_eq!(features.record.num_children, 0.0);
    assert_eq!(features.total_guests, 2.0);
    assert_eq!(features.lead_time_month, 6.0);
    assert_eq!(features.is_peak_season, 1.0);
    assert_eq!(features.booking_type.as_str(), "Standard");
}

#[test]
fn test_training_separates_classes() {
    let outcome = TrainingRun::new(training_config())
        .execute(&dirty_bookings(80))
        .unwrap();

    assert!(outcome.pipeline.metadata.cv_f1 > 0.9);
    assert!(outcome.test_f1 > 0.9);
    assert_eq!(outcome.scores.len(), 3);

    let no_show = outcome
        .pipeline
        .predict(&booking("Suite", "June", 900.0).to_raw())
        .unwrap();
    assert_eq!(no_show.prediction, Outcome::NoShow);

    let check_in = outcome
        .pipeline
        .predict(&booking("Deluxe", "March", 95.0).to_raw())
        .unwrap();
    assert_eq!(check_in.prediction, Outcome::CheckIn);
}

#[test]
fn test_pipeline_handles_dirty_inference_input() {
    let outcome = TrainingRun::new(training_config())
        .execute(&dirty_bookings(80))
        .unwrap();

    // Garbled fields at inference time: currency marker, spelled-out
    // count, missing room, lower-case month.
    let mut raw = RawRecord::new();
    raw.set("branch", json!("Orchard"));
    raw.set("booking_month", json!("may"));
    raw.set("arrival_month", json!("june"));
    raw.set("price", json!("USD$667"));
    raw.set("num_adults", json!("two"));

    let prediction = outcome.pipeline.predict(&raw).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn test_artifact_round_trip_preserves_predictions() {
    let outcome = TrainingRun::new(training_config())
        .execute(&dirty_bookings(80))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.bin");
    outcome.pipeline.save(&path).unwrap();

    let restored = Pipeline::load(&path).unwrap();
    assert_eq!(
        restored.metadata.model_name,
        outcome.pipeline.metadata.model_name
    );
    assert_eq!(
        restored.decision_threshold,
        outcome.pipeline.decision_threshold
    );

    for input in [
        booking("Suite", "June", 900.0),
        booking("Deluxe", "March", 95.0),
        booking("Penthouse", "October", 400.0), // room unseen at fit time
    ] {
        let raw = input.to_raw();
        let before = outcome.pipeline.predict(&raw).unwrap();
        let after = restored.predict(&raw).unwrap();
        assert_eq!(before.prediction, after.prediction);
        assert!((before.probability - after.probability).abs() < 1e-12);
    }
}

#[test]
fn test_serving_context_from_artifact() {
    let outcome = TrainingRun::new(training_config())
        .execute(&dirty_bookings(80))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.bin");
    outcome.pipeline.save(&path).unwrap();

    let context = ServingContext::from_artifact(&path, Arc::new(OfflineInsightGenerator)).unwrap();
    let prediction = context.predict(&booking("Suite", "June", 900.0)).unwrap();
    assert_eq!(prediction.prediction, Outcome::NoShow);
    assert_eq!(prediction.threshold, context.threshold());

    let names = context.feature_names();
    assert!(names.contains(&"num__price".to_string()));
    assert!(names.iter().any(|n| n.starts_with("cat__room__")));

    let report = context.analysis().unwrap();
    assert!(report.contains("price"));
}

#[test]
fn test_missing_artifact_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.bin");
    assert!(ServingContext::from_artifact(&path, Arc::new(OfflineInsightGenerator)).is_err());
}
