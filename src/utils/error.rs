use serde::Serialize;
use thiserror::Error;

/// Broad classification used by the outer boundary to pick a response signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input; 4xx-equivalent.
    Client,
    /// Broken invariant between pipeline stages or a failing collaborator; 5xx-equivalent.
    Internal,
    /// Missing or corrupt model artifacts; the process must not serve.
    Startup,
}

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Invalid request: {0}")]
    ClientInput(String),
    #[error("Invalid input error: {0}")]
    InvalidInput(String),
    #[error("Model inference error: {0}")]
    ModelInference(String),
    #[error("Model artifact error: {0}")]
    ArtifactLoad(String),
    #[error("Image processing error: {0}")]
    ImageProcessing(String),
    #[error("OCR error: {0}")]
    Ocr(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::ClientInput(_) => ErrorKind::Client,
            RiskError::ArtifactLoad(_) | RiskError::Config(_) => ErrorKind::Startup,
            RiskError::InvalidInput(_)
            | RiskError::ModelInference(_)
            | RiskError::ImageProcessing(_)
            | RiskError::Ocr(_) => ErrorKind::Internal,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Client
    }

    /// HTTP-style status for hosts that transport results over a web endpoint.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Client => 400,
            ErrorKind::Internal | ErrorKind::Startup => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// Outbound error payload, `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let err = RiskError::ClientInput("missing field `Age`".to_string());
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_body().error, "Invalid request: missing field `Age`");
    }

    #[test]
    fn test_pipeline_defects_are_internal() {
        let scaler = RiskError::InvalidInput("NaN feature".to_string());
        let model = RiskError::ModelInference("expected 3 features, got 2".to_string());
        assert_eq!(scaler.kind(), ErrorKind::Internal);
        assert_eq!(model.kind(), ErrorKind::Internal);
        assert_eq!(model.status_code(), 500);
    }

    #[test]
    fn test_artifact_errors_are_startup() {
        let err = RiskError::ArtifactLoad("scaler.json not found".to_string());
        assert_eq!(err.kind(), ErrorKind::Startup);
        assert!(!err.is_client_error());
    }
}
