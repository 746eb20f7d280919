use crate::training::metrics::f1_score;

/// Decision threshold applied when the selected model produces no
/// probabilities and calibration cannot run.
pub const DEFAULT_THRESHOLD: f64 = 0.35;

const SWEEP_START: f64 = 0.20;
const SWEEP_STEP: f64 = 0.01;
const SWEEP_STEPS: usize = 50;

/// Result of a threshold sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdReport {
    pub threshold: f64,
    pub f1: f64,
}

/// Sweep decision thresholds over `[0.20, 0.70)` in steps of 0.01 and
/// pick the one maximizing F1 on the held-out labels. Ties go to the
/// lowest threshold, so the sweep is fully deterministic.
pub fn calibrate_threshold(probabilities: &[f64], labels: &[u8]) -> ThresholdReport {
    let mut best = ThresholdReport {
        threshold: SWEEP_START,
        f1: -1.0,
    };

    for step in 0..SWEEP_STEPS {
        let threshold = SWEEP_START + step as f64 * SWEEP_STEP;
        let predicted: Vec<u8> = probabilities
            .iter()
            .map(|&p| u8::from(p >= threshold))
            .collect();
        let f1 = f1_score(labels, &predicted);
        if f1 > best.f1 {
            best = ThresholdReport { threshold, f1 };
        }
    }

    ThresholdReport {
        threshold: best.threshold,
        f1: best.f1.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_finds_separating_threshold() {
        // Positives all above 0.6, negatives all below 0.4.
        let probabilities = [0.9, 0.8, 0.7, 0.65, 0.3, 0.2, 0.1, 0.35];
        let labels = [1, 1, 1, 1, 0, 0, 0, 0];
        let report = calibrate_threshold(&probabilities, &labels);

        assert_eq!(report.f1, 1.0);
        assert!(report.threshold > 0.35 && report.threshold <= 0.65);
    }

    #[test]
    fn test_ties_favor_lowest_threshold() {
        // Every threshold in the sweep classifies these identically,
        // so the first threshold must win.
        let probabilities = [0.9, 0.9, 0.1, 0.1];
        let labels = [1, 1, 0, 0];
        let report = calibrate_threshold(&probabilities, &labels);

        assert_eq!(report.f1, 1.0);
        assert!((report.threshold - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_f1_returns_sweep_start() {
        // No threshold produces a true positive.
        let probabilities = [0.9, 0.9];
        let labels = [0, 0];
        let report = calibrate_threshold(&probabilities, &labels);

        assert_eq!(report.f1, 0.0);
        assert!((report.threshold - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_is_deterministic() {
        let probabilities = [0.55, 0.45, 0.65, 0.25, 0.85, 0.15];
        let labels = [1, 0, 1, 0, 1, 0];
        let first = calibrate_threshold(&probabilities, &labels);
        let second = calibrate_threshold(&probabilities, &labels);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_threshold_value() {
        assert!((DEFAULT_THRESHOLD - 0.35).abs() < 1e-9);
    }
}
