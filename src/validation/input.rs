// Boundary parsing for inbound requests
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use crate::models::FEATURE_COUNT;
use crate::utils::RiskError;

/// Numeric-path request body, `{"Age": .., "BloodPressure": .., "Cholesterol": ..}`.
///
/// Unknown keys are ignored. Missing keys and non-numeric values are client errors.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VitalsInput {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
}

impl VitalsInput {
    pub fn from_json_str(body: &str) -> Result<Self, RiskError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| RiskError::ClientInput(format!("Malformed JSON body: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, RiskError> {
        if !value.is_object() {
            return Err(RiskError::ClientInput(
                "Request body must be a JSON object".to_string(),
            ));
        }
        let input: VitalsInput =
            serde_json::from_value(value).map_err(|e| RiskError::ClientInput(e.to_string()))?;
        input.validate()?;
        Ok(input)
    }

    /// Rejects NaN and infinite values, which JSON cannot carry but other callers can.
    pub fn validate(&self) -> Result<(), RiskError> {
        let fields = [
            ("Age", self.age),
            ("BloodPressure", self.blood_pressure),
            ("Cholesterol", self.cholesterol),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(RiskError::ClientInput(format!(
                "{} must be a finite number, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }

    /// Model inputs in the trained column order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [self.age, self.blood_pressure, self.cholesterol]
    }
}

/// Document-path request body carrying a base64 encoded scan, `{"image": ".."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPayload {
    #[serde(default)]
    pub image: Option<String>,
}

impl DocumentPayload {
    pub fn from_json_str(body: &str) -> Result<Self, RiskError> {
        serde_json::from_str(body)
            .map_err(|e| RiskError::ClientInput(format!("Malformed JSON body: {}", e)))
    }

    /// Raw image bytes. Accepts plain base64 or a `data:` URL.
    pub fn image_bytes(&self) -> Result<Vec<u8>, RiskError> {
        let encoded = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RiskError::ClientInput("No image file uploaded".to_string()))?;

        let encoded = match encoded.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => encoded,
        };

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| RiskError::ClientInput(format!("Image is not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(RiskError::ClientInput("No image file uploaded".to_string()));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vitals() {
        let input =
            VitalsInput::from_json_str(r#"{"Age": 63, "BloodPressure": 145, "Cholesterol": 230}"#)
                .unwrap();
        assert_eq!(input.features(), [63.0, 145.0, 230.0]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let input = VitalsInput::from_json_str(
            r#"{"Age": 40, "BloodPressure": 120, "Cholesterol": 180, "Email": "a@b.co"}"#,
        )
        .unwrap();
        assert_eq!(input.age, 40.0);
    }

    #[test]
    fn test_missing_key_is_client_error() {
        let err = VitalsInput::from_json_str(r#"{"Age": 63, "BloodPressure": 145}"#).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Cholesterol"));
    }

    #[test]
    fn test_wrong_type_is_client_error() {
        let err = VitalsInput::from_json_str(
            r#"{"Age": "sixty", "BloodPressure": 145, "Cholesterol": 230}"#,
        )
        .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_array_body_is_client_error() {
        let err = VitalsInput::from_json_str("[63, 145, 230]").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_non_finite_vitals_are_client_errors() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let input = VitalsInput {
                age: bad,
                blood_pressure: 145.0,
                cholesterol: 230.0,
            };
            let err = input.validate().unwrap_err();
            assert!(err.is_client_error());
            assert!(err.to_string().contains("Age"));
        }
    }

    #[test]
    fn test_malformed_json_is_client_error() {
        assert!(VitalsInput::from_json_str("{Age: 63").unwrap_err().is_client_error());
    }

    #[test]
    fn test_document_payload_decodes_base64() {
        let payload = DocumentPayload::from_json_str(r#"{"image": "iVBORw0KGgo="}"#).unwrap();
        assert_eq!(
            payload.image_bytes().unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
        );
    }

    #[test]
    fn test_document_payload_accepts_data_url() {
        let payload = DocumentPayload {
            image: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        };
        assert_eq!(payload.image_bytes().unwrap().len(), 8);
    }

    #[test]
    fn test_missing_image_is_client_error() {
        let payload = DocumentPayload::from_json_str("{}").unwrap();
        assert!(payload.image_bytes().unwrap_err().is_client_error());
    }

    #[test]
    fn test_bad_base64_is_client_error() {
        let payload = DocumentPayload {
            image: Some("***".to_string()),
        };
        assert!(payload.image_bytes().unwrap_err().is_client_error());
    }
}
