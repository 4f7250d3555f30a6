//! 截图保存
//!
//! The scanner asks a sink to keep a copy of each frame that entered a screen.
//! Numbering is owned by the caller; sinks only write.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::error::ScanError;
use super::frame::Frame;

pub trait ArtifactSink {
    /// `ordinal` counts entries of `screen_tag` within the current run, from 0.
    fn persist(&self, screen_tag: &str, ordinal: u32, frame: &Frame) -> Result<(), ScanError>;
}

pub struct NullArtifactSink;

impl ArtifactSink for NullArtifactSink {
    fn persist(&self, _screen_tag: &str, _ordinal: u32, _frame: &Frame) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Writes `<dir>/<tag>_frame_<n>.png`.
pub struct PngArtifactWriter {
    output_dir: PathBuf,
}

impl PngArtifactWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Result<Self, ScanError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, screen_tag: &str, ordinal: u32) -> PathBuf {
        let stem = screen_tag.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        self.output_dir.join(format!("{}_frame_{}.png", stem, ordinal))
    }
}

impl ArtifactSink for PngArtifactWriter {
    fn persist(&self, screen_tag: &str, ordinal: u32, frame: &Frame) -> Result<(), ScanError> {
        let path = self.path_for(screen_tag, ordinal);
        frame.to_rgb_image()?.save(&path)?;
        debug!("Saved {} frame {} to {}", screen_tag, frame.frame_number, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_naming() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PngArtifactWriter::new(dir.path()).unwrap();
        assert_eq!(
            writer.path_for("Stigmata", 3),
            dir.path().join("stigmata_frame_3.png")
        );
        assert_eq!(
            writer.path_for("Abyss Battle", 0),
            dir.path().join("abyss_battle_frame_0.png")
        );
    }

    #[test]
    fn test_persist_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PngArtifactWriter::new(dir.path().join("nested")).unwrap();
        let frame = Frame::new(3, 2, vec![0x40u8; 18], 0, 7).unwrap();

        writer.persist("Lineup", 0, &frame).unwrap();

        let saved = image::open(writer.path_for("Lineup", 0)).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (3, 2));
        assert_eq!(saved.get_pixel(2, 1).0, [0x40, 0x40, 0x40]);
    }
}
