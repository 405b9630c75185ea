// Line-based field extraction from recognised report text
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::{CandidateRecord, Field};

/// A per-line rule: when `label` matches a line, the first digit run on that
/// line becomes the candidate value for `field`.
pub struct LineRule {
    pub field: Field,
    label: Regex,
}

impl LineRule {
    fn new(field: Field, label: &str) -> Self {
        LineRule {
            field,
            label: Regex::new(label).unwrap(),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.label.is_match(line)
    }
}

lazy_static! {
    /// Evaluated in order; the first rule whose label matches claims the line.
    static ref LINE_RULES: Vec<LineRule> = vec![
        // Whole word only, so "average" or "dosage" never count as an age label.
        LineRule::new(Field::Age, r"(?i)\bage\b"),
        LineRule::new(Field::BloodPressure, r"(?i)blood\s+pressure|\bbp\b"),
        LineRule::new(Field::Cholesterol, r"(?i)cholesterol"),
    ];

    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
}

/// Turns OCR text into a `CandidateRecord`.
///
/// Extraction is best effort and never fails: a field whose label is missing,
/// or whose labelled line carries no digits, is left unset. When several lines
/// match the same rule the last one that carries digits wins.
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn rules() -> &'static [LineRule] {
        LINE_RULES.as_slice()
    }

    pub fn extract(text: &str) -> CandidateRecord {
        let mut candidate = CandidateRecord::default();

        // Lone carriage returns count as line breaks too.
        for line in text.split(['\n', '\r']) {
            let line = line.trim();
            let rule = match LINE_RULES.iter().find(|rule| rule.matches(line)) {
                Some(rule) => rule,
                None => continue,
            };
            if let Some(value) = Self::first_digit_run(line) {
                debug!("{} candidate {:?} from line {:?}", rule.field, value, line);
                candidate.set(rule.field, value);
            }
        }

        candidate.email = Self::extract_email(text);

        debug!("Extracted fields: {:?}", candidate.found_fields());
        candidate
    }

    /// First address in the whitespace-collapsed text.
    pub fn extract_email(text: &str) -> Option<String> {
        let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
        EMAIL_PATTERN
            .find(&flattened)
            .map(|m| m.as_str().to_string())
    }

    fn first_digit_run(line: &str) -> Option<String> {
        DIGIT_RUN.find(line).map(|m| m.as_str().to_string())
    }
}
