use crate::models::{ClassProbabilities, RiskAssessment, RiskCategory};

/// Picks the most probable class. On an exact tie the earlier class in
/// Low, Medium, High order wins.
pub struct CategorizationPolicy;

impl CategorizationPolicy {
    pub fn categorize(probabilities: &ClassProbabilities) -> RiskCategory {
        let values = probabilities.as_array();
        let mut best = 0;
        // Strict comparison keeps the earliest class on ties.
        for (i, value) in values.iter().enumerate().skip(1) {
            if *value > values[best] {
                best = i;
            }
        }
        RiskCategory::ALL[best]
    }

    pub fn assess(probabilities: ClassProbabilities) -> RiskAssessment {
        RiskAssessment {
            category: Self::categorize(&probabilities),
            probabilities,
        }
    }
}
