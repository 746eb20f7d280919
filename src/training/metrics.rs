/// Confusion counts for a binary classification task where 1 is the
/// positive (no-show) class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl BinaryConfusion {
    /// Tally confusion counts for paired label slices.
    pub fn from_labels(actual: &[u8], predicted: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            match (a, p) {
                (1, 1) => counts.true_positives += 1,
                (0, 1) => counts.false_positives += 1,
                (0, 0) => counts.true_negatives += 1,
                _ => counts.false_negatives += 1,
            }
        }
        counts
    }

    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.true_positives
            + self.false_positives
            + self.true_negatives
            + self.false_negatives;
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }
}

/// F1 of the positive class over paired label slices.
pub fn f1_score(actual: &[u8], predicted: &[u8]) -> f64 {
    BinaryConfusion::from_labels(actual, predicted).f1()
}
