use image::GrayImage;
use log::debug;
use tesseract::Tesseract;

use crate::config::OcrConfig;
use crate::processing::ImageProcessor;
use crate::utils::RiskError;

/// Optical character recognition backend.
pub trait TextRecognizer: Send + Sync {
    /// Recognise the text on a preprocessed page, one report line per output line.
    fn recognize(&self, image: &GrayImage) -> Result<String, RiskError>;
}

/// Tesseract-backed recognizer.
pub struct TesseractRecognizer {
    language: String,
    page_seg_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(config: &OcrConfig) -> Self {
        TesseractRecognizer {
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String, RiskError> {
        let temp_file = ImageProcessor::save_to_temp_file(image)?;
        let path_str = temp_file
            .path()
            .to_str()
            .ok_or_else(|| RiskError::Ocr("Failed to convert path to string".to_string()))?;

        let mut tess = Tesseract::new(None, Some(self.language.as_str()))
            .map_err(|e| RiskError::Ocr(format!("Tesseract init error: {}", e)))?
            .set_variable("tessedit_pageseg_mode", &self.page_seg_mode.to_string())
            .map_err(|e| RiskError::Ocr(format!("Tesseract set variable error: {}", e)))?
            .set_image(path_str)
            .map_err(|e| RiskError::Ocr(format!("Tesseract set image error: {}", e)))?;

        tess.get_text()
            .map_err(|e| RiskError::Ocr(format!("Tesseract error: {}", e)))
    }
}

pub struct OcrProcessor;

impl OcrProcessor {
    /// Decode, preprocess and recognise an uploaded scan.
    pub fn read_document(
        image_data: &[u8],
        recognizer: &dyn TextRecognizer,
        config: &OcrConfig,
    ) -> Result<String, RiskError> {
        let page = ImageProcessor::process_bytes(image_data, config.binarize)?;
        let text = recognizer.recognize(&page)?;
        debug!("OCR text output:\n{}", text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    struct CannedRecognizer(&'static str);

    impl TextRecognizer for CannedRecognizer {
        fn recognize(&self, image: &GrayImage) -> Result<String, RiskError> {
            assert!(image.width() > 0);
            Ok(self.0.to_string())
        }
    }

    fn blank_png() -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(GrayImage::new(4, 4))
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_read_document_uses_recognizer() {
        let text = OcrProcessor::read_document(
            &blank_png(),
            &CannedRecognizer("Age: 45 years"),
            &OcrConfig::default(),
        )
        .unwrap();
        assert_eq!(text, "Age: 45 years");
    }

    #[test]
    fn test_missing_image_never_reaches_recognizer() {
        let result = OcrProcessor::read_document(
            &[],
            &CannedRecognizer("unused"),
            &OcrConfig::default(),
        );
        assert!(matches!(result, Err(RiskError::ClientInput(_))));
    }
}
