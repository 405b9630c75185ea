use std::collections::BTreeMap;

use log::debug;

use crate::models::{
    CandidateRecord, ExtractionReport, Field, FieldConfidence, PatientRecord, EMAIL_NOT_FOUND,
};

pub const DEFAULT_AGE: u32 = 50;
pub const DEFAULT_BLOOD_PRESSURE: u32 = 120;
pub const DEFAULT_CHOLESTEROL: u32 = 200;

/// Fills gaps left by extraction so that every record reaching the model is complete.
///
/// A numeric field falls back to its default when it is unset or does not parse
/// as an unsigned integer. Values are not range checked: an age of 999 is kept.
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn normalize(candidate: &CandidateRecord) -> PatientRecord {
        Self::normalize_with_report(candidate).record
    }

    pub fn normalize_with_report(candidate: &CandidateRecord) -> ExtractionReport {
        let mut confidence = BTreeMap::new();

        let age = Self::numeric(candidate, Field::Age, &mut confidence);
        let blood_pressure = Self::numeric(candidate, Field::BloodPressure, &mut confidence);
        let cholesterol = Self::numeric(candidate, Field::Cholesterol, &mut confidence);

        let email = match candidate.email.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => {
                confidence.insert(Field::Email, FieldConfidence::Found);
                address.to_string()
            }
            _ => {
                debug!("Email not found on document");
                confidence.insert(Field::Email, FieldConfidence::Defaulted);
                EMAIL_NOT_FOUND.to_string()
            }
        };

        ExtractionReport {
            record: PatientRecord {
                age,
                blood_pressure,
                cholesterol,
                email,
            },
            confidence,
        }
    }

    /// Fallback for a numeric field; `None` for `Field::Email`.
    pub fn default_for(field: Field) -> Option<u32> {
        match field {
            Field::Age => Some(DEFAULT_AGE),
            Field::BloodPressure => Some(DEFAULT_BLOOD_PRESSURE),
            Field::Cholesterol => Some(DEFAULT_CHOLESTEROL),
            Field::Email => None,
        }
    }

    fn numeric(
        candidate: &CandidateRecord,
        field: Field,
        confidence: &mut BTreeMap<Field, FieldConfidence>,
    ) -> u32 {
        let default = Self::default_for(field).unwrap_or_default();
        match candidate.get(field).map(|raw| raw.trim().parse::<u32>()) {
            Some(Ok(value)) => {
                confidence.insert(field, FieldConfidence::Found);
                value
            }
            Some(Err(e)) => {
                debug!("{} candidate unusable ({}), defaulting to {}", field, e, default);
                confidence.insert(field, FieldConfidence::Defaulted);
                default
            }
            None => {
                debug!("{} not found, defaulting to {}", field, default);
                confidence.insert(field, FieldConfidence::Defaulted);
                default
            }
        }
    }
}
