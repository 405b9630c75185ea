pub mod error;

pub use error::{ErrorBody, ErrorKind, RiskError};
