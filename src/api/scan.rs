//! 录屏扫描入口

use std::path::PathBuf;

use log::info;

use crate::core::ocr::{TesseractCli, TesseractConfig};
use crate::core::video::{ArtifactSink, FrameSource, ImageSequenceSource, NullArtifactSink, PngArtifactWriter, ScanError};
use crate::screen_scanner::{EventTimeline, ScanStats, ScannerConfig, ScreenCatalog, ScreenScanner, TextRecognizer};

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub frames_dir: PathBuf,
    /// JSON5 catalog; the built-in Honkai tables when absent.
    pub catalog_path: Option<PathBuf>,
    /// Where entry frames are saved; nothing is saved when absent.
    pub output_dir: Option<PathBuf>,
    pub fps: f64,
    pub tessdata_dir: Option<PathBuf>,
    pub config: ScannerConfig,
}

impl ScanRequest {
    pub fn new<P: Into<PathBuf>>(frames_dir: P) -> Self {
        Self {
            frames_dir: frames_dir.into(),
            catalog_path: None,
            output_dir: None,
            fps: 30.0,
            tessdata_dir: None,
            config: ScannerConfig::default(),
        }
    }

    pub fn load_catalog(&self) -> Result<ScreenCatalog, ScanError> {
        match &self.catalog_path {
            Some(path) => ScreenCatalog::load(path),
            None => Ok(ScreenCatalog::honkai_default()),
        }
    }

    fn artifact_sink(&self) -> Result<Box<dyn ArtifactSink>, ScanError> {
        Ok(match &self.output_dir {
            Some(dir) => Box::new(PngArtifactWriter::new(dir)?),
            None => Box::new(NullArtifactSink),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub timeline: EventTimeline,
    pub stats: ScanStats,
}

/// Scan a directory of frames with tesseract.
///
/// Catalog, engine and output directory are all checked before the first
/// frame is read.
pub fn scan_image_sequence(request: &ScanRequest) -> Result<ScanReport, ScanError> {
    let catalog = request.load_catalog()?;
    let recognizer = TesseractCli::new(TesseractConfig {
        tessdata_dir: request.tessdata_dir.clone(),
        ..Default::default()
    })?;
    let artifacts = request.artifact_sink()?;
    let mut source = ImageSequenceSource::open(&request.frames_dir, request.fps)?;

    info!("📂 Streaming frames from {}", request.frames_dir.display());
    scan_frames(&mut source, catalog, request.config.clone(), &recognizer, artifacts)
}

/// Drive a scanner over any source until it is exhausted.
pub fn scan_frames<'r, S: FrameSource + ?Sized>(
    source: &mut S,
    catalog: ScreenCatalog,
    config: ScannerConfig,
    recognizer: &'r dyn TextRecognizer,
    artifacts: Box<dyn ArtifactSink + 'r>,
) -> Result<ScanReport, ScanError> {
    let mut scanner = ScreenScanner::with_config(catalog, config, recognizer)?.with_artifact_sink(artifacts);
    let stats = scanner.run(source);
    Ok(ScanReport {
        timeline: scanner.into_timeline(),
        stats,
    })
}
