pub mod extractors;
pub mod image;
pub mod ocr;

pub use extractors::{FieldExtractor, LineRule};
pub use self::image::ImageProcessor;
pub use ocr::{OcrProcessor, TesseractRecognizer, TextRecognizer};
