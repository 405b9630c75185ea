// Inference stages: standardization, one-vs-rest scoring, and the final label

pub mod categorization;
pub mod classifier;
pub mod scaler;

pub use categorization::CategorizationPolicy;
pub use classifier::RiskClassifier;
pub use scaler::FeatureScaler;
