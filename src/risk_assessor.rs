use log::{debug, info};
use serde::Serialize;

use crate::config::{AppConfig, OcrConfig};
use crate::ml::{CategorizationPolicy, FeatureScaler, RiskClassifier};
use crate::models::*;
use crate::processing::{FieldExtractor, OcrProcessor, TesseractRecognizer, TextRecognizer};
use crate::utils::RiskError;
use crate::validation::{DocumentPayload, RecordNormalizer, VitalsInput};

/// Result of the combined document path: what was read, and what it means.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAssessment {
    pub extraction: PatientRecord,
    pub confidence: std::collections::BTreeMap<Field, FieldConfidence>,
    pub assessment: RiskAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub features: Vec<String>,
    pub classes: Vec<&'static str>,
}

/// Entry point for hosts. Holds the loaded model context and the OCR backend;
/// every method takes `&self` and keeps no per-request state, so one instance
/// can serve concurrent callers.
pub struct RiskAssessor {
    context: ModelContext,
    recognizer: Box<dyn TextRecognizer>,
    ocr: OcrConfig,
}

impl RiskAssessor {
    pub fn new(context: ModelContext, recognizer: Box<dyn TextRecognizer>, ocr: OcrConfig) -> Self {
        RiskAssessor {
            context,
            recognizer,
            ocr,
        }
    }

    /// Load artifacts and set up tesseract. Any failure here is fatal for the host.
    pub fn from_config(config: &AppConfig) -> Result<Self, RiskError> {
        let context = ModelContext::load(config)?;
        let recognizer = TesseractRecognizer::new(&config.ocr);
        Ok(Self::new(context, Box::new(recognizer), config.ocr.clone()))
    }

    /// Scale, score and label a raw feature triple.
    pub fn classify(context: &ModelContext, features: &[f64]) -> Result<RiskAssessment, RiskError> {
        let scaled = FeatureScaler::transform(features, context.scaler())?;
        let probabilities = RiskClassifier::predict_proba(&scaled, context.model())?;
        let assessment = CategorizationPolicy::assess(probabilities);
        debug!(
            "Classified {:?} as {} ({:?})",
            features, assessment.category, assessment.probabilities
        );
        Ok(assessment)
    }

    // Numeric path

    pub fn predict(&self, input: &VitalsInput) -> Result<RiskAssessment, RiskError> {
        input.validate()?;
        Self::classify(&self.context, &input.features())
    }

    pub fn predict_json(&self, body: &str) -> Result<RiskAssessment, RiskError> {
        let input = VitalsInput::from_json_str(body)?;
        self.predict(&input)
    }

    pub fn assess_record(&self, record: &PatientRecord) -> Result<RiskAssessment, RiskError> {
        Self::classify(&self.context, &record.features())
    }

    // Document path

    /// Extraction from text an OCR engine already produced. Never fails.
    pub fn extract_text(text: &str) -> ExtractionReport {
        let candidate = FieldExtractor::extract(text);
        RecordNormalizer::normalize_with_report(&candidate)
    }

    pub fn extract_document(&self, image_data: &[u8]) -> Result<ExtractionReport, RiskError> {
        let text = OcrProcessor::read_document(image_data, self.recognizer.as_ref(), &self.ocr)?;
        let report = Self::extract_text(&text);
        let defaulted = report.defaulted_fields();
        if !defaulted.is_empty() {
            info!("Fields defaulted after OCR: {:?}", defaulted);
        }
        Ok(report)
    }

    pub fn extract_payload(&self, payload: &DocumentPayload) -> Result<ExtractionReport, RiskError> {
        let image_data = payload.image_bytes()?;
        self.extract_document(&image_data)
    }

    pub fn assess_document(&self, image_data: &[u8]) -> Result<DocumentAssessment, RiskError> {
        let report = self.extract_document(image_data)?;
        let assessment = self.assess_record(&report.record)?;
        Ok(DocumentAssessment {
            extraction: report.record,
            confidence: report.confidence,
            assessment,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            status: "ok",
            features: self.context.model().feature_names().to_vec(),
            classes: RiskCategory::ALL.iter().map(|c| c.label()).collect(),
        }
    }
}
