use crate::error::{AppError, Result};
use linfa::traits::Fit;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

const DEFAULT_N_TREES: u16 = 100;
const DEFAULT_MAX_DEPTH: u16 = 12;
const DEFAULT_MAX_ITERATIONS: u64 = 500;
const DEFAULT_SEED: u64 = 42;

/// Classifier family tags as they appear in the training configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierFamily {
    /// Random forest ensemble.
    Rf,
    /// Single-layer perceptron, trained as logistic regression.
    Mlp,
    /// Gradient-boosted surrogate: a single gini decision tree.
    Xgb,
}

impl ClassifierFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierFamily::Rf => "rf",
            ClassifierFamily::Mlp => "mlp",
            ClassifierFamily::Xgb => "xgb",
        }
    }
}

/// Hyperparameters for a candidate. Fields that do not apply to a given
/// family are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateParams {
    pub n_trees: Option<u16>,
    pub max_depth: Option<u16>,
    pub min_samples_leaf: Option<usize>,
    pub max_iterations: Option<u64>,
    pub seed: Option<u64>,
}

/// One candidate model declared in the training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub family: ClassifierFamily,
    #[serde(default)]
    pub params: CandidateParams,
}

fn default_enabled() -> bool {
    true
}

/// Linear decision function extracted from a fitted logistic regression.
///
/// Kept as plain coefficients so the artifact stays serializable and the
/// probability orientation is pinned at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Sigmoid of the decision function, per row.
    pub fn probabilities(&self, features: &Array2<f64>) -> Vec<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                let score: f64 = row
                    .iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.intercept;
                1.0 / (1.0 + (-score).exp())
            })
            .collect()
    }

    fn flip(&mut self) {
        for w in &mut self.weights {
            *w = -*w;
        }
        self.intercept = -self.intercept;
    }
}

/// A trained candidate, ready for prediction and artifact serialization.
#[derive(Debug, Serialize, Deserialize)]
pub enum FittedClassifier {
    RandomForest(RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>),
    Perceptron(LinearModel),
    BoostedTree(DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>),
}

impl FittedClassifier {
    pub fn family(&self) -> ClassifierFamily {
        match self {
            FittedClassifier::RandomForest(_) => ClassifierFamily::Rf,
            FittedClassifier::Perceptron(_) => ClassifierFamily::Mlp,
            FittedClassifier::BoostedTree(_) => ClassifierFamily::Xgb,
        }
    }

    /// Hard 0/1 predictions, one per row.
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<u8>> {
        match self {
            FittedClassifier::RandomForest(model) => {
                let x = ndarray_to_densematrix(features);
                let predictions = model
                    .predict(&x)
                    .map_err(|e| AppError::Training(format!("random forest predict: {e}")))?;
                Ok(predictions.iter().map(|&p| u8::from(p == 1)).collect())
            }
            FittedClassifier::Perceptron(model) => Ok(model
                .probabilities(features)
                .iter()
                .map(|&p| u8::from(p >= 0.5))
                .collect()),
            FittedClassifier::BoostedTree(model) => {
                let x = ndarray_to_densematrix(features);
                let predictions = model
                    .predict(&x)
                    .map_err(|e| AppError::Training(format!("decision tree predict: {e}")))?;
                Ok(predictions.iter().map(|&p| u8::from(p == 1)).collect())
            }
        }
    }

    /// Positive-class probabilities, when the family supports them.
    /// Tree families emit hard labels only and return `None`.
    pub fn probabilities(&self, features: &Array2<f64>) -> Result<Option<Vec<f64>>> {
        match self {
            FittedClassifier::Perceptron(model) => Ok(Some(model.probabilities(features))),
            FittedClassifier::RandomForest(_) | FittedClassifier::BoostedTree(_) => Ok(None),
        }
    }
}

/// Train one candidate on an encoded feature matrix.
pub fn fit_candidate(
    spec: &CandidateSpec,
    features: &Array2<f64>,
    labels: &[u8],
) -> Result<FittedClassifier> {
    if features.nrows() != labels.len() {
        return Err(AppError::Training(format!(
            "feature rows ({}) do not match labels ({})",
            features.nrows(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(AppError::Training("empty training set".to_string()));
    }

    match spec.family {
        ClassifierFamily::Rf => fit_random_forest(&spec.params, features, labels),
        ClassifierFamily::Mlp => Ok(FittedClassifier::Perceptron(fit_perceptron(
            &spec.params,
            features,
            labels,
        )?)),
        ClassifierFamily::Xgb => fit_boosted_tree(&spec.params, features, labels),
    }
}

fn fit_random_forest(
    params: &CandidateParams,
    features: &Array2<f64>,
    labels: &[u8],
) -> Result<FittedClassifier> {
    let x = ndarray_to_densematrix(features);
    let y: Vec<i32> = labels.iter().map(|&l| l as i32).collect();

    let mut forest_params = RandomForestClassifierParameters::default()
        .with_n_trees(params.n_trees.unwrap_or(DEFAULT_N_TREES))
        .with_seed(params.seed.unwrap_or(DEFAULT_SEED));
    if let Some(depth) = params.max_depth {
        forest_params = forest_params.with_max_depth(depth);
    }
    if let Some(leaf) = params.min_samples_leaf {
        forest_params = forest_params.with_min_samples_leaf(leaf);
    }

    let model = RandomForestClassifier::fit(&x, &y, forest_params)
        .map_err(|e| AppError::Training(format!("random forest fit: {e}")))?;
    Ok(FittedClassifier::RandomForest(model))
}

fn fit_boosted_tree(
    params: &CandidateParams,
    features: &Array2<f64>,
    labels: &[u8],
) -> Result<FittedClassifier> {
    let x = ndarray_to_densematrix(features);
    let y: Vec<i32> = labels.iter().map(|&l| l as i32).collect();

    let mut tree_params = DecisionTreeClassifierParameters::default()
        .with_criterion(SplitCriterion::Gini)
        .with_max_depth(params.max_depth.unwrap_or(DEFAULT_MAX_DEPTH));
    if let Some(leaf) = params.min_samples_leaf {
        tree_params = tree_params.with_min_samples_leaf(leaf);
    }

    let model = DecisionTreeClassifier::fit(&x, &y, tree_params)
        .map_err(|e| AppError::Training(format!("decision tree fit: {e}")))?;
    Ok(FittedClassifier::BoostedTree(model))
}

fn fit_perceptron(
    params: &CandidateParams,
    features: &Array2<f64>,
    labels: &[u8],
) -> Result<LinearModel> {
    let targets = Array1::from_iter(labels.iter().map(|&l| l as usize));
    let dataset = linfa::Dataset::new(features.clone(), targets);

    let fitted = LogisticRegression::default()
        .max_iterations(params.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS))
        .fit(&dataset)
        .map_err(|e| AppError::Training(format!("logistic regression fit: {e}")))?;

    let mut model = LinearModel {
        weights: fitted.params().to_vec(),
        intercept: fitted.intercept(),
    };

    // The solver picks its own positive class; orient the extracted
    // coefficients so label 1 scores higher.
    let probabilities = model.probabilities(features);
    let (mut positive_sum, mut positive_n) = (0.0, 0usize);
    let (mut negative_sum, mut negative_n) = (0.0, 0usize);
    for (p, &label) in probabilities.iter().zip(labels) {
        if label == 1 {
            positive_sum += p;
            positive_n += 1;
        } else {
            negative_sum += p;
            negative_n += 1;
        }
    }
    if positive_n > 0
        && negative_n > 0
        && positive_sum / (positive_n as f64) < negative_sum / negative_n as f64
    {
        model.flip();
    }

    Ok(model)
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn spec(family: ClassifierFamily) -> CandidateSpec {
        CandidateSpec {
            name: family.as_str().to_string(),
            enabled: true,
            family,
            params: CandidateParams::default(),
        }
    }

    /// Two well-separated clusters, alternating labels.
    fn separable() -> (Array2<f64>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            if i % 2 == 0 {
                rows.push([i as f64 * 0.1, 1.0]);
                labels.push(0);
            } else {
                rows.push([10.0 + i as f64 * 0.1, -1.0]);
                labels.push(1);
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        (
            Array2::from_shape_vec((20, 2), flat).unwrap(),
            labels,
        )
    }

    #[test]
    fn test_family_tags() {
        assert_eq!(
            serde_json::to_string(&ClassifierFamily::Rf).unwrap(),
            "\"rf\""
        );
        assert_eq!(
            serde_json::from_str::<ClassifierFamily>("\"xgb\"").unwrap(),
            ClassifierFamily::Xgb
        );
    }

    #[test]
    fn test_random_forest_learns_separable_data() {
        let (x, y) = separable();
        let model = fit_candidate(&spec(ClassifierFamily::Rf), &x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.probabilities(&x).unwrap().is_none());
    }

    #[test]
    fn test_boosted_tree_learns_separable_data() {
        let (x, y) = separable();
        let model = fit_candidate(&spec(ClassifierFamily::Xgb), &x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.probabilities(&x).unwrap().is_none());
    }

    #[test]
    fn test_perceptron_probabilities_are_oriented() {
        let (x, y) = separable();
        let model = fit_candidate(&spec(ClassifierFamily::Mlp), &x, &y).unwrap();
        let probabilities = model.probabilities(&x).unwrap().unwrap();

        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        let positive_mean: f64 = probabilities
            .iter()
            .zip(&y)
            .filter(|(_, &l)| l == 1)
            .map(|(p, _)| p)
            .sum::<f64>()
            / 10.0;
        let negative_mean: f64 = probabilities
            .iter()
            .zip(&y)
            .filter(|(_, &l)| l == 0)
            .map(|(p, _)| p)
            .sum::<f64>()
            / 10.0;
        assert!(positive_mean > negative_mean);
    }

    #[test]
    fn test_mismatched_rows_and_labels_fail() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let err = fit_candidate(&spec(ClassifierFamily::Rf), &x, &[1]).unwrap_err();
        assert!(matches!(err, AppError::Training(_)));
    }

    #[test]
    fn test_linear_model_flip() {
        let mut model = LinearModel {
            weights: vec![1.0, -2.0],
            intercept: 0.5,
        };
        let x = array![[1.0, 1.0]];
        let before = model.probabilities(&x)[0];
        model.flip();
        let after = model.probabilities(&x)[0];
        assert!((before + after - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_candidate_spec_deserialization() {
        let spec: CandidateSpec = serde_json::from_str(
            r#"{"name": "random_forest", "type": "rf", "params": {"n_trees": 50}}"#,
        )
        .unwrap();
        assert!(spec.enabled);
        assert_eq!(spec.family, ClassifierFamily::Rf);
        assert_eq!(spec.params.n_trees, Some(50));
        assert_eq!(spec.params.max_depth, None);
    }
}
