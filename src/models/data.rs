use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel stored in `PatientRecord::email` when no address was recognised.
pub const EMAIL_NOT_FOUND: &str = "Not found";

/// Number of model inputs: age, blood pressure, cholesterol.
pub const FEATURE_COUNT: usize = 3;

/// Fields recognised on a scanned report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Age,
    BloodPressure,
    Cholesterol,
    Email,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Age,
        Field::BloodPressure,
        Field::Cholesterol,
        Field::Email,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::BloodPressure => "BloodPressure",
            Field::Cholesterol => "Cholesterol",
            Field::Email => "Email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, possibly incomplete output of the field extractor.
///
/// Numeric fields hold a run of ASCII digits exactly as read from the scan;
/// `email` holds an address matched by the email pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    pub age: Option<String>,
    pub blood_pressure: Option<String>,
    pub cholesterol: Option<String>,
    pub email: Option<String>,
}

impl CandidateRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Age => self.age.as_deref(),
            Field::BloodPressure => self.blood_pressure.as_deref(),
            Field::Cholesterol => self.cholesterol.as_deref(),
            Field::Email => self.email.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Age => &mut self.age,
            Field::BloodPressure => &mut self.blood_pressure,
            Field::Cholesterol => &mut self.cholesterol,
            Field::Email => &mut self.email,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|field| self.get(*field).is_none())
    }

    pub fn found_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_some())
            .collect()
    }
}

impl From<&PatientRecord> for CandidateRecord {
    fn from(record: &PatientRecord) -> Self {
        CandidateRecord {
            age: Some(record.age.to_string()),
            blood_pressure: Some(record.blood_pressure.to_string()),
            cholesterol: Some(record.cholesterol.to_string()),
            email: record.email().map(str::to_string),
        }
    }
}

/// A complete record; every field is present after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: u32,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: u32,
    #[serde(rename = "Email")]
    pub email: String,
}

impl PatientRecord {
    /// Model inputs in the trained column order: age, blood pressure, cholesterol.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.age),
            f64::from(self.blood_pressure),
            f64::from(self.cholesterol),
        ]
    }

    /// The recognised address, or `None` when the sentinel is stored.
    pub fn email(&self) -> Option<&str> {
        if self.email == EMAIL_NOT_FOUND {
            None
        } else {
            Some(&self.email)
        }
    }
}

/// Whether a normalized field was read from the document or substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldConfidence {
    Found,
    Defaulted,
}

/// Normalized record plus per-field provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    pub record: PatientRecord,
    pub confidence: BTreeMap<Field, FieldConfidence>,
}

impl ExtractionReport {
    pub fn defaulted_fields(&self) -> Vec<Field> {
        self.confidence
            .iter()
            .filter(|(_, confidence)| **confidence == FieldConfidence::Defaulted)
            .map(|(field, _)| *field)
            .collect()
    }
}

/// Ordered model input. Scaled in place by the feature scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        FeatureVector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

impl From<[f64; 3]> for FeatureVector {
    fn from(values: [f64; 3]) -> Self {
        FeatureVector::new(values.to_vec())
    }
}

/// Risk classes in model output order. The order doubles as tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

    pub fn index(&self) -> usize {
        match self {
            RiskCategory::Low => 0,
            RiskCategory::Medium => 1,
            RiskCategory::High => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Training label used in model artifacts.
    pub fn class_name(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Low Risk")]
    pub low: f64,
    #[serde(rename = "Medium Risk")]
    pub medium: f64,
    #[serde(rename = "High Risk")]
    pub high: f64,
}

impl ClassProbabilities {
    pub fn from_array(values: [f64; 3]) -> Self {
        ClassProbabilities {
            low: values[0],
            medium: values[1],
            high: values[2],
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.low, self.medium, self.high]
    }

    pub fn sum(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub category: RiskCategory,
    pub probabilities: ClassProbabilities,
}
