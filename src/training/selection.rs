use crate::error::{AppError, Result};
use crate::preprocessing::ColumnTransform;
use crate::records::FeatureRecord;
use crate::training::classifier::{fit_candidate, CandidateSpec, ClassifierFamily};
use crate::training::metrics::f1_score;

/// Cross-validation outcome for one candidate.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub name: String,
    pub family: ClassifierFamily,
    pub mean_f1: f64,
    pub fold_scores: Vec<f64>,
    pub failed: bool,
}

/// The winning candidate plus the full scoreboard.
#[derive(Debug, Clone)]
pub struct Selection {
    pub best: CandidateSpec,
    pub best_score: f64,
    pub scores: Vec<CandidateScore>,
}

/// Score every enabled candidate with k-fold cross-validation and pick
/// the best by mean F1. A candidate whose training fails on any fold is
/// scored zero and excluded from selection. Ties keep the candidate
/// declared first, so reordering the configuration is the only way to
/// change the winner among equals.
pub fn select_candidate(
    candidates: &[CandidateSpec],
    records: &[FeatureRecord],
    labels: &[u8],
    numeric: &[String],
    categorical: &[String],
    folds: usize,
) -> Result<Selection> {
    let enabled: Vec<&CandidateSpec> = candidates.iter().filter(|c| c.enabled).collect();
    if enabled.is_empty() {
        return Err(AppError::Configuration(
            "no enabled training candidates".to_string(),
        ));
    }

    let mut scores = Vec::with_capacity(enabled.len());
    for spec in &enabled {
        let score = match cross_validate(spec, records, labels, numeric, categorical, folds) {
            Ok(fold_scores) => {
                let mean_f1 = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
                CandidateScore {
                    name: spec.name.clone(),
                    family: spec.family,
                    mean_f1,
                    fold_scores,
                    failed: false,
                }
            }
            Err(e) => {
                tracing::warn!(candidate = %spec.name, error = %e, "Candidate failed, scoring zero");
                CandidateScore {
                    name: spec.name.clone(),
                    family: spec.family,
                    mean_f1: 0.0,
                    fold_scores: Vec::new(),
                    failed: true,
                }
            }
        };
        tracing::info!(
            candidate = %score.name,
            mean_f1 = format!("{:.4}", score.mean_f1),
            "Cross-validation complete"
        );
        scores.push(score);
    }

    let best_index = pick_best(&scores).ok_or_else(|| {
        AppError::Training("every training candidate failed cross-validation".to_string())
    })?;

    Ok(Selection {
        best: enabled[best_index].clone(),
        best_score: scores[best_index].mean_f1,
        scores,
    })
}

/// Index of the best non-failed score, first-declared winning ties.
pub fn pick_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, score) in scores.iter().enumerate() {
        if score.failed {
            continue;
        }
        match best {
            None => best = Some(index),
            Some(current) if score.mean_f1 > scores[current].mean_f1 => best = Some(index),
            Some(_) => {}
        }
    }
    best
}

/// Deterministic contiguous k-fold cross-validation. The column
/// transform is refitted on each fold's training portion so validation
/// rows never leak into vocabulary or scaling statistics.
fn cross_validate(
    spec: &CandidateSpec,
    records: &[FeatureRecord],
    labels: &[u8],
    numeric: &[String],
    categorical: &[String],
    folds: usize,
) -> Result<Vec<f64>> {
    if folds < 2 {
        return Err(AppError::Configuration(format!(
            "cross-validation needs at least 2 folds, got {folds}"
        )));
    }
    let n = records.len();
    if n < folds {
        return Err(AppError::Training(format!(
            "{n} samples cannot fill {folds} folds"
        )));
    }

    let mut fold_scores = Vec::with_capacity(folds);
    for fold in 0..folds {
        let start = fold * n / folds;
        let end = (fold + 1) * n / folds;

        let mut train_records = Vec::with_capacity(n - (end - start));
        let mut train_labels = Vec::with_capacity(n - (end - start));
        for (index, (record, &label)) in records.iter().zip(labels).enumerate() {
            if index < start || index >= end {
                train_records.push(record.clone());
                train_labels.push(label);
            }
        }
        let validation_records = &records[start..end];
        let validation_labels = &labels[start..end];

        let mut transform = ColumnTransform::new(numeric, categorical)?;
        let x_train = transform.fit_apply(&train_records)?;
        let x_validation = transform.apply(validation_records)?;

        let model = fit_candidate(spec, &x_train, &train_labels)?;
        let predicted = model.predict(&x_validation)?;
        fold_scores.push(f1_score(validation_labels, &predicted));
    }

    Ok(fold_scores)
}
