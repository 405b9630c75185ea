use crate::utils::RiskError;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::{otsu_level, threshold};
use tempfile::NamedTempFile;

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decode an uploaded scan. Missing or undecodable payloads are caller errors.
    pub fn decode(image_data: &[u8]) -> Result<DynamicImage, RiskError> {
        if image_data.is_empty() {
            return Err(RiskError::ClientInput("No image file uploaded".to_string()));
        }
        image::load_from_memory(image_data)
            .map_err(|e| RiskError::ClientInput(format!("Failed to decode image: {}", e)))
    }

    pub fn preprocess(img: &DynamicImage, binarize: bool) -> GrayImage {
        let gray = img.to_luma8();
        if binarize {
            let level = otsu_level(&gray);
            threshold(&gray, level)
        } else {
            gray
        }
    }

    pub fn process_bytes(image_data: &[u8], binarize: bool) -> Result<GrayImage, RiskError> {
        let img = Self::decode(image_data)?;
        Ok(Self::preprocess(&img, binarize))
    }

    /// Write a PNG copy for engines that only read from disk. The file is
    /// removed when the returned handle is dropped.
    pub fn save_to_temp_file(img: &GrayImage) -> Result<NamedTempFile, RiskError> {
        let temp_file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| RiskError::ImageProcessing(format!("Failed to create temp file: {}", e)))?;

        img.save_with_format(temp_file.path(), ImageFormat::Png)
            .map_err(|e| RiskError::ImageProcessing(format!("Failed to write temp image: {}", e)))?;

        Ok(temp_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Luma};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = GrayImage::from_fn(16, 16, |x, _| if x < 8 { Luma([30u8]) } else { Luma([220u8]) });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_empty_payload_is_client_error() {
        assert!(matches!(
            ImageProcessor::decode(&[]),
            Err(RiskError::ClientInput(_))
        ));
    }

    #[test]
    fn test_garbage_payload_is_client_error() {
        assert!(matches!(
            ImageProcessor::decode(b"definitely not a png"),
            Err(RiskError::ClientInput(_))
        ));
    }

    #[test]
    fn test_binarize_produces_two_levels() {
        let gray = ImageProcessor::process_bytes(&png_bytes(), true).unwrap();
        assert_eq!(gray.dimensions(), (16, 16));
        assert!(gray.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(15, 0)[0], 255);
    }

    #[test]
    fn test_temp_file_round_trip() {
        let gray = ImageProcessor::process_bytes(&png_bytes(), false).unwrap();
        let file = ImageProcessor::save_to_temp_file(&gray).unwrap();
        let reloaded = image::open(file.path()).unwrap().to_luma8();
        assert_eq!(reloaded, gray);
    }
}
