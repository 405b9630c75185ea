use crate::models::{ClassProbabilities, ClassifierModel, FeatureVector, RiskCategory};
use crate::utils::RiskError;

/// One-vs-rest logistic inference.
///
/// Each class gets an independent probability `sigmoid(w_k . x + b_k)`. These do
/// not sum to one, so they are renormalised into a distribution. The
/// renormalisation runs on log-probabilities to stay finite when every score
/// saturates.
pub struct RiskClassifier;

impl RiskClassifier {
    pub fn predict_proba(
        features: &FeatureVector,
        model: &ClassifierModel,
    ) -> Result<ClassProbabilities, RiskError> {
        let scores = Self::decision_scores(features, model)?;

        let log_probs = scores.map(log_sigmoid);
        let max = log_probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights = log_probs.map(|lp| (lp - max).exp());
        let total: f64 = weights.iter().sum();

        if !(total.is_finite() && total > 0.0) {
            return Err(RiskError::ModelInference(format!(
                "Cannot normalise class scores {:?}",
                scores
            )));
        }

        Ok(ClassProbabilities::from_array(
            weights.map(|w| (w / total).clamp(0.0, 1.0)),
        ))
    }

    /// Raw linear score per class, in `RiskCategory::ALL` order.
    pub fn decision_scores(
        features: &FeatureVector,
        model: &ClassifierModel,
    ) -> Result<[f64; 3], RiskError> {
        if features.len() != model.n_features() {
            return Err(RiskError::ModelInference(format!(
                "Model expects {} features, got {}",
                model.n_features(),
                features.len()
            )));
        }

        let mut scores = [0.0; 3];
        for category in RiskCategory::ALL {
            let k = category.index();
            let score = model.coefficients()[k]
                .iter()
                .zip(features.as_slice())
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + model.intercepts()[k];
            if !score.is_finite() {
                return Err(RiskError::ModelInference(format!(
                    "Score for {} is not finite",
                    category
                )));
            }
            scores[k] = score;
        }
        Ok(scores)
    }
}

// ln(sigmoid(z)) = -softplus(-z)
fn log_sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        -(-z).exp().ln_1p()
    } else {
        z - z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ClassifierModel {
        ClassifierModel::new(
            vec!["Age".to_string(), "BloodPressure".to_string(), "Cholesterol".to_string()],
            vec![
                vec![-1.1, -1.0, -0.9],
                vec![0.1, 0.05, 0.05],
                vec![1.2, 1.0, 0.9],
            ],
            vec![-0.8, 0.2, -1.0],
        )
        .unwrap()
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    #[test]
    fn test_matches_normalised_sigmoids() {
        let features = FeatureVector::from([0.5, -0.25, 1.0]);
        let scores = RiskClassifier::decision_scores(&features, &model()).unwrap();
        let raw = scores.map(sigmoid);
        let total: f64 = raw.iter().sum();

        let probs = RiskClassifier::predict_proba(&features, &model()).unwrap();
        for (p, r) in probs.as_array().iter().zip(raw) {
            assert!((p - r / total).abs() < 1e-12);
        }
    }

    #[test]
    fn test_probabilities_form_distribution() {
        let grid = [-1e6, -40.0, -3.0, -0.5, 0.0, 0.5, 3.0, 40.0, 1e6];
        for a in grid {
            for b in grid {
                for c in grid {
                    let features = FeatureVector::from([a, b, c]);
                    let probs = RiskClassifier::predict_proba(&features, &model()).unwrap();
                    for p in probs.as_array() {
                        assert!((0.0..=1.0).contains(&p), "{:?} -> {:?}", [a, b, c], probs);
                    }
                    assert!((probs.sum() - 1.0).abs() < 1e-6, "{:?} -> {:?}", [a, b, c], probs);
                }
            }
        }
    }

    #[test]
    fn test_older_patient_scores_higher_risk() {
        let young = RiskClassifier::predict_proba(&FeatureVector::from([-2.0, -1.0, -1.0]), &model())
            .unwrap();
        let old = RiskClassifier::predict_proba(&FeatureVector::from([2.0, 1.0, 1.0]), &model())
            .unwrap();
        assert!(young.low > young.high);
        assert!(old.high > old.low);
        assert!(old.high > young.high);
    }

    #[test]
    fn test_dimension_mismatch_is_inference_error() {
        let err = RiskClassifier::predict_proba(&FeatureVector::new(vec![1.0, 2.0]), &model())
            .unwrap_err();
        assert!(matches!(err, RiskError::ModelInference(_)));
    }

    #[test]
    fn test_non_finite_feature_is_inference_error() {
        let err =
            RiskClassifier::predict_proba(&FeatureVector::from([f64::INFINITY, 0.0, 0.0]), &model())
                .unwrap_err();
        assert!(matches!(err, RiskError::ModelInference(_)));
    }

    #[test]
    fn test_log_sigmoid() {
        for z in [-30.0, -2.0, 0.0, 2.0, 30.0] {
            assert!((log_sigmoid(z) - sigmoid(z).ln()).abs() < 1e-12);
        }
        assert!(log_sigmoid(-1e6).is_finite());
    }
}
