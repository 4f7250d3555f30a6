//! Tesseract CLI recognizer

use std::path::PathBuf;
use std::process::Command;

use image::{GrayImage, RgbImage};
use log::{debug, error, info};
use tempfile::NamedTempFile;

use crate::core::video::{PixelView, ScanError};
use crate::screen_scanner::TextRecognizer;

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub executable: PathBuf,
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
    /// 6 = assume a single uniform block of text
    pub page_seg_mode: u8,
    pub dpi: u32,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            tessdata_dir: None,
            language: "eng".to_string(),
            page_seg_mode: 6,
            dpi: 300,
        }
    }
}

/// Runs the `tesseract` executable once per region. Stateless between calls.
pub struct TesseractCli {
    config: TesseractConfig,
}

impl TesseractCli {
    /// Check the executable answers `--version` before any frame is processed.
    pub fn new(config: TesseractConfig) -> Result<Self, ScanError> {
        info!("🔧 Probing tesseract at: {}", config.executable.display());

        let output = Command::new(&config.executable)
            .arg("--version")
            .output()
            .map_err(|e| {
                error!("❌ Could not start tesseract: {}", e);
                ScanError::Configuration(format!(
                    "tesseract not runnable at {}: {}",
                    config.executable.display(),
                    e
                ))
            })?;

        let banner = String::from_utf8_lossy(&output.stdout);
        let version = banner.lines().next().unwrap_or("unknown version");
        info!("✅ Initialized {} ({})", version.trim(), config.language);

        Ok(Self { config })
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn write_input(image: &PixelView<'_>) -> Result<NamedTempFile, ScanError> {
        let (width, height) = image.dimensions();
        let temp_input = NamedTempFile::with_suffix(".png")?;

        match image.channels() {
            1 => GrayImage::from_raw(width, height, image.to_packed_vec())
                .ok_or_else(|| ScanError::InvalidBuffer("gray buffer size mismatch".into()))?
                .save(temp_input.path())?,
            3 => RgbImage::from_raw(width, height, image.to_packed_vec())
                .ok_or_else(|| ScanError::InvalidBuffer("RGB buffer size mismatch".into()))?
                .save(temp_input.path())?,
            other => {
                return Err(ScanError::InvalidBuffer(format!(
                    "tesseract input needs 1 or 3 channels, got {}",
                    other
                )))
            }
        }

        Ok(temp_input)
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &PixelView<'_>) -> Result<String, ScanError> {
        let temp_input = Self::write_input(image)?;

        let mut command = Command::new(&self.config.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_seg_mode.to_string())
            .arg("--dpi")
            .arg(self.config.dpi.to_string());
        if let Some(dir) = &self.config.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }

        debug!(
            "Running tesseract on {}x{} region",
            image.width(),
            image.height()
        );
        let output = command
            .output()
            .map_err(|e| ScanError::Recognition(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
