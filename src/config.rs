use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::utils::RiskError;

/// Environment variable that relocates the model artifact directory.
pub const ASSETS_DIR_ENV: &str = "AROGY_ASSETS_DIR";

/// Root configuration, deserialized from an optional JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the fitted model artifacts.
    pub assets_dir: PathBuf,
    /// Scaler parameter file name, relative to `assets_dir`.
    pub scaler_file: String,
    /// Classifier parameter file name, relative to `assets_dir`.
    pub model_file: String,
    pub ocr: OcrConfig,
}

/// Settings handed to the OCR engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code.
    pub language: String,
    /// Tesseract page segmentation mode. `6` treats the page as one uniform block of text.
    pub page_seg_mode: u8,
    /// Apply Otsu binarization before recognition.
    pub binarize: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            assets_dir: PathBuf::from("assets"),
            scaler_file: "scaler.json".to_string(),
            model_file: "heart_attack_model.json".to_string(),
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            language: "eng".to_string(),
            page_seg_mode: 6,
            binarize: false,
        }
    }
}

impl AppConfig {
    /// Load from `path` if given, otherwise start from defaults, then apply
    /// the `AROGY_ASSETS_DIR` override.
    pub fn load(path: Option<&Path>) -> Result<Self, RiskError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Ok(dir) = env::var(ASSETS_DIR_ENV) {
            if !dir.is_empty() {
                config.assets_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, RiskError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            RiskError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let config: AppConfig = serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("Invalid configuration: {}", e)))?;
        if config.ocr.page_seg_mode > 13 {
            return Err(RiskError::Config(format!(
                "Unsupported page segmentation mode {}",
                config.ocr.page_seg_mode
            )));
        }
        Ok(config)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.assets_dir.join(&self.scaler_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.assets_dir.join(&self.model_file)
    }
}
