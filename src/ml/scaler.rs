use crate::models::{FeatureVector, PatientRecord, ScalerParams};
use crate::utils::RiskError;

/// Applies the fitted standardization, `(x - mean) / scale`, per feature.
pub struct FeatureScaler;

impl FeatureScaler {
    pub fn transform(values: &[f64], params: &ScalerParams) -> Result<FeatureVector, RiskError> {
        let mut features = FeatureVector::new(values.to_vec());
        Self::transform_in_place(&mut features, params)?;
        Ok(features)
    }

    pub fn scale_record(
        record: &PatientRecord,
        params: &ScalerParams,
    ) -> Result<FeatureVector, RiskError> {
        Self::transform(&record.features(), params)
    }

    pub fn transform_in_place(
        features: &mut FeatureVector,
        params: &ScalerParams,
    ) -> Result<(), RiskError> {
        if features.len() != params.n_features() {
            return Err(RiskError::InvalidInput(format!(
                "Expected {} features, got {}",
                params.n_features(),
                features.len()
            )));
        }

        if let Some(i) = features.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(RiskError::InvalidInput(format!(
                "Feature {} is not numeric",
                feature_name(params, i)
            )));
        }

        for ((value, mean), scale) in features
            .values_mut()
            .iter_mut()
            .zip(params.mean())
            .zip(params.scale())
        {
            *value = (*value - mean) / scale;
        }

        if let Some(i) = features.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(RiskError::InvalidInput(format!(
                "Feature {} overflowed during scaling",
                feature_name(params, i)
            )));
        }
        Ok(())
    }
}

fn feature_name(params: &ScalerParams, index: usize) -> String {
    params
        .feature_names()
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("#{}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScalerParams {
        ScalerParams::new(
            vec!["Age".to_string(), "BloodPressure".to_string(), "Cholesterol".to_string()],
            vec![40.0, 140.0, 220.0],
            vec![10.0, 20.0, 40.0],
        )
        .unwrap()
    }

    #[test]
    fn test_transform() {
        let scaled = FeatureScaler::transform(&[50.0, 120.0, 220.0], &params()).unwrap();
        assert_eq!(scaled.as_slice(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_scale_record_is_deterministic() {
        let record = PatientRecord {
            age: 63,
            blood_pressure: 145,
            cholesterol: 230,
            email: "Not found".to_string(),
        };
        let first = FeatureScaler::scale_record(&record, &params()).unwrap();
        let second = FeatureScaler::scale_record(&record, &params()).unwrap();
        for (a, b) in first.as_slice().iter().zip(second.as_slice()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_non_numeric_feature_is_invalid_input() {
        let err = FeatureScaler::transform(&[50.0, f64::NAN, 200.0], &params()).unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
        assert!(err.to_string().contains("BloodPressure"));
    }

    #[test]
    fn test_wrong_length_is_invalid_input() {
        let err = FeatureScaler::transform(&[50.0, 120.0], &params()).unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
    }

    #[test]
    fn test_params_untouched() {
        let params = params();
        let before = params.clone();
        FeatureScaler::transform(&[1.0, 2.0, 3.0], &params).unwrap();
        assert_eq!(params, before);
    }
}
