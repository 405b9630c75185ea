pub mod config;
pub mod ml;
pub mod models;
pub mod processing;
pub mod risk_assessor;
pub mod utils;
pub mod validation;

pub use config::AppConfig;
pub use risk_assessor::RiskAssessor;
pub use utils::RiskError;
