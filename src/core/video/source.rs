//! 帧来源
//!
//! Frames come out in presentation order. `None` means the source is exhausted;
//! an `Err` only concerns the one frame that failed and the caller may keep
//! pulling.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::error::ScanError;
use super::frame::Frame;

pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Result<Frame, ScanError>>;
}

/// In-memory frames, mostly for tests and callers that decode elsewhere.
pub struct VecFrameSource {
    frames: VecDeque<Frame>,
}

impl VecFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for VecFrameSource {
    fn next_frame(&mut self) -> Option<Result<Frame, ScanError>> {
        self.frames.pop_front().map(Ok)
    }
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A directory of still frames (`frame_0001.png`, ...), read in file-name order.
pub struct ImageSequenceSource {
    paths: VecDeque<PathBuf>,
    fps: f64,
    next_number: u64,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(dir: P, fps: f64) -> Result<Self, ScanError> {
        let dir = dir.as_ref();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ScanError::Configuration(format!("invalid fps {}", fps)));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && Self::is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        info!(
            "🎞️ ImageSequenceSource: {} frames in {} at {} fps",
            paths.len(),
            dir.display(),
            fps
        );

        Ok(Self {
            paths: paths.into(),
            fps,
            next_number: 0,
        })
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }

    fn timestamp_ms(&self, frame_number: u64) -> u64 {
        (frame_number as f64 * 1000.0 / self.fps).round() as u64
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Option<Result<Frame, ScanError>> {
        let path = self.paths.pop_front()?;
        let frame_number = self.next_number;
        self.next_number += 1;

        debug!("Decoding frame {} from {}", frame_number, path.display());
        let result = image::open(&path)
            .map_err(ScanError::from)
            .and_then(|img| {
                Frame::from_rgb_image(img.to_rgb8(), self.timestamp_ms(frame_number), frame_number)
            });
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn test_frame(n: u64) -> Frame {
        Frame::new(2, 2, vec![n as u8; 12], n * 40, n).unwrap()
    }

    #[test]
    fn test_vec_source_preserves_order() {
        let mut source = VecFrameSource::new(vec![test_frame(0), test_frame(1), test_frame(2)]);
        let mut seen = Vec::new();
        while let Some(frame) = source.next_frame() {
            seen.push(frame.unwrap().frame_number);
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_image_sequence_sorted_and_numbered() {
        let dir = tempfile::tempdir().unwrap();
        for (name, shade) in [("frame_002.png", 20u8), ("frame_000.png", 0), ("frame_001.png", 10)] {
            RgbImage::from_pixel(4, 3, Rgb([shade, shade, shade]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 25.0).unwrap();
        assert_eq!(source.remaining(), 3);

        let mut frames = Vec::new();
        while let Some(frame) = source.next_frame() {
            frames.push(frame.unwrap());
        }

        let shades: Vec<u8> = frames.iter().map(|f| f.pixels().pixel(0, 0).unwrap()[0]).collect();
        assert_eq!(shades, vec![0, 10, 20]);
        assert_eq!(frames[2].frame_number, 2);
        assert_eq!(frames[2].timestamp_ms(), 80);
        assert_eq!(frames[0].dimensions(), (4, 3));
    }

    #[test]
    fn test_undecodable_file_fails_only_that_frame() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"garbage").unwrap();
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))
            .save(dir.path().join("b.png"))
            .unwrap();

        let mut source = ImageSequenceSource::open(dir.path(), 30.0).unwrap();
        assert!(source.next_frame().unwrap().is_err());
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.frame_number, 1);
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_rejects_bad_fps() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path(), 0.0),
            Err(ScanError::Configuration(_))
        ));
    }
}
