// Fitted model artifacts and the immutable context shared by every request

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::{RiskCategory, FEATURE_COUNT};
use crate::utils::RiskError;

/// Per-feature standardization parameters, `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl ScalerParams {
    pub fn new(
        feature_names: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, RiskError> {
        let params = ScalerParams {
            feature_names,
            mean,
            scale,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let params: ScalerParams = serde_json::from_str(json)
            .map_err(|e| RiskError::ArtifactLoad(format!("Malformed scaler parameters: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, RiskError> {
        Self::from_json(&read_artifact(path)?)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    fn validate(&self) -> Result<(), RiskError> {
        let n = self.mean.len();
        if n == 0 {
            return Err(RiskError::ArtifactLoad("Scaler has no features".to_string()));
        }
        if self.scale.len() != n || self.feature_names.len() != n {
            return Err(RiskError::ArtifactLoad(format!(
                "Scaler dimensions disagree: {} names, {} means, {} scales",
                self.feature_names.len(),
                n,
                self.scale.len()
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(RiskError::ArtifactLoad("Scaler mean is not finite".to_string()));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(RiskError::ArtifactLoad(
                "Scaler scale must be finite and non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// One-vs-rest logistic model over the ordered classes Low, Medium, High.
///
/// `coefficients[k]` and `intercepts[k]` belong to the binary classifier for
/// class `k`. Class balancing and calibration happen at fit time; only the
/// resulting linear parameters are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierModel {
    classes: Vec<String>,
    feature_names: Vec<String>,
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl ClassifierModel {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, RiskError> {
        let model = ClassifierModel {
            classes: RiskCategory::ALL
                .iter()
                .map(|c| c.class_name().to_string())
                .collect(),
            feature_names,
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let model: ClassifierModel = serde_json::from_str(json)
            .map_err(|e| RiskError::ArtifactLoad(format!("Malformed classifier parameters: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, RiskError> {
        Self::from_json(&read_artifact(path)?)
    }

    /// Input dimensionality the model was fit on.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    fn validate(&self) -> Result<(), RiskError> {
        let expected: Vec<&str> = RiskCategory::ALL.iter().map(|c| c.class_name()).collect();
        if self.classes != expected {
            return Err(RiskError::ArtifactLoad(format!(
                "Classifier classes must be {:?}, found {:?}",
                expected, self.classes
            )));
        }
        if self.coefficients.len() != expected.len() || self.intercepts.len() != expected.len() {
            return Err(RiskError::ArtifactLoad(format!(
                "Classifier needs one coefficient row and intercept per class, found {} rows and {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        let n = self.n_features();
        if n == 0 {
            return Err(RiskError::ArtifactLoad("Classifier has no features".to_string()));
        }
        for (class, row) in expected.iter().zip(&self.coefficients) {
            if row.len() != n {
                return Err(RiskError::ArtifactLoad(format!(
                    "Coefficient row for class {} has {} entries, expected {}",
                    class,
                    row.len(),
                    n
                )));
            }
        }
        let finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(self.intercepts.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(RiskError::ArtifactLoad(
                "Classifier parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scaler and classifier loaded once at startup and read concurrently afterwards.
///
/// Nothing in the crate mutates a context once built; share it by reference
/// (or behind an `Arc`) across request handlers.
#[derive(Debug, Clone)]
pub struct ModelContext {
    scaler: ScalerParams,
    model: ClassifierModel,
}

impl ModelContext {
    pub fn new(scaler: ScalerParams, model: ClassifierModel) -> Result<Self, RiskError> {
        if scaler.n_features() != FEATURE_COUNT {
            return Err(RiskError::ArtifactLoad(format!(
                "Scaler has {} features but records provide {}",
                scaler.n_features(),
                FEATURE_COUNT
            )));
        }
        if scaler.n_features() != model.n_features() {
            return Err(RiskError::ArtifactLoad(format!(
                "Scaler produces {} features but classifier expects {}",
                scaler.n_features(),
                model.n_features()
            )));
        }
        Ok(ModelContext { scaler, model })
    }

    pub fn load(config: &AppConfig) -> Result<Self, RiskError> {
        let scaler_path = config.scaler_path();
        let model_path = config.model_path();
        info!("Loading scaler parameters from {}", scaler_path.display());
        let scaler = ScalerParams::load(&scaler_path)?;
        info!("Loading classifier parameters from {}", model_path.display());
        let model = ClassifierModel::load(&model_path)?;
        let context = Self::new(scaler, model)?;
        info!(
            "Model context ready ({} features: {})",
            context.model.n_features(),
            context.model.feature_names().join(", ")
        );
        Ok(context)
    }

    pub fn scaler(&self) -> &ScalerParams {
        &self.scaler
    }

    pub fn model(&self) -> &ClassifierModel {
        &self.model
    }
}

fn read_artifact(path: &Path) -> Result<String, RiskError> {
    fs::read_to_string(path).map_err(|e| {
        RiskError::ArtifactLoad(format!("Failed to read {}: {}", path.display(), e))
    })
}
