use crate::error::{AppError, Result};
use crate::preprocessing::normalizer::UNKNOWN;
use crate::records::{FeatureRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-column statistics frozen at fit time for a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NumericStats {
    median: f64,
    mean: f64,
    std: f64,
}

/// Turns feature records into a dense numeric matrix.
///
/// Numeric columns are median-imputed and standardized; categorical
/// columns are one-hot encoded over the vocabulary seen at fit time.
/// Categories unseen during fitting encode as an all-zero block, so the
/// output width never changes after fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransform {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_stats: Vec<NumericStats>,
    vocabularies: Vec<Vec<String>>,
    fitted: bool,
}

impl ColumnTransform {
    /// Create an unfitted transform over the given schema columns.
    /// Column names outside the feature schema are rejected.
    pub fn new(numeric: &[String], categorical: &[String]) -> Result<Self> {
        for column in numeric {
            if !NUMERIC_COLUMNS.contains(&column.as_str()) {
                return Err(AppError::Schema(format!(
                    "unknown numeric column: {column}"
                )));
            }
        }
        for column in categorical {
            if !CATEGORICAL_COLUMNS.contains(&column.as_str()) {
                return Err(AppError::Schema(format!(
                    "unknown categorical column: {column}"
                )));
            }
        }

        Ok(Self {
            numeric_columns: numeric.to_vec(),
            categorical_columns: categorical.to_vec(),
            numeric_stats: Vec::new(),
            vocabularies: Vec::new(),
            fitted: false,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Learn imputation medians, scaling statistics, and categorical
    /// vocabularies from a training batch.
    pub fn fit(&mut self, batch: &[FeatureRecord]) -> Result<()> {
        if batch.is_empty() {
            return Err(AppError::Training(
                "cannot fit column transform on an empty batch".to_string(),
            ));
        }

        self.numeric_stats = self
            .numeric_columns
            .iter()
            .map(|column| {
                let values: Vec<f64> = batch
                    .iter()
                    .filter_map(|r| r.numeric(column))
                    .filter(|v| v.is_finite())
                    .collect();
                fit_numeric(&values)
            })
            .collect();

        self.vocabularies = self
            .categorical_columns
            .iter()
            .map(|column| {
                let categories: BTreeSet<String> = batch
                    .iter()
                    .map(|r| r.categorical(column).unwrap_or(UNKNOWN).to_string())
                    .collect();
                categories.into_iter().collect()
            })
            .collect();

        self.fitted = true;
        Ok(())
    }

    /// Encode a batch into a dense `(rows, output_dim)` matrix.
    pub fn apply(&self, batch: &[FeatureRecord]) -> Result<Array2<f64>> {
        if !self.fitted {
            return Err(AppError::Training(
                "column transform has not been fitted".to_string(),
            ));
        }

        let dim = self.output_dim();
        let mut data = Vec::with_capacity(batch.len() * dim);

        for record in batch {
            for (column, stats) in self.numeric_columns.iter().zip(&self.numeric_stats) {
                let value = record
                    .numeric(column)
                    .filter(|v| v.is_finite())
                    .unwrap_or(stats.median);
                data.push((value - stats.mean) / stats.std);
            }
            for (column, vocabulary) in self.categorical_columns.iter().zip(&self.vocabularies) {
                let value = record.categorical(column).unwrap_or(UNKNOWN);
                let hit = vocabulary.binary_search_by(|c| c.as_str().cmp(value)).ok();
                for index in 0..vocabulary.len() {
                    data.push(if hit == Some(index) { 1.0 } else { 0.0 });
                }
            }
        }

        Array2::from_shape_vec((batch.len(), dim), data)
            .map_err(|e| AppError::Internal(format!("feature matrix shape: {e}")))
    }

    /// Fit on a batch and encode it.
    pub fn fit_apply(&mut self, batch: &[FeatureRecord]) -> Result<Array2<f64>> {
        self.fit(batch)?;
        self.apply(batch)
    }

    /// Width of the encoded matrix.
    pub fn output_dim(&self) -> usize {
        self.numeric_columns.len() + self.vocabularies.iter().map(Vec::len).sum::<usize>()
    }

    /// Names of the output features, one per matrix column, in encoding
    /// order: `num__<column>` then `cat__<column>__<category>`.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.output_dim());
        for column in &self.numeric_columns {
            names.push(format!("num__{column}"));
        }
        for (column, vocabulary) in self.categorical_columns.iter().zip(&self.vocabularies) {
            for category in vocabulary {
                names.push(format!("cat__{column}__{category}"));
            }
        }
        names
    }
}

fn fit_numeric(values: &[f64]) -> NumericStats {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    };

    let n = sorted.len() as f64;
    let (mean, std) = if sorted.is_empty() {
        (0.0, 1.0)
    } else {
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        // Constant columns scale by one instead of dividing by zero.
        (mean, if std > 1e-12 { std } else { 1.0 })
    };

    NumericStats { median, mean, std }
}
