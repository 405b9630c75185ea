pub mod input;
pub mod normalizer;

pub use input::{DocumentPayload, VitalsInput};
pub use normalizer::RecordNormalizer;
