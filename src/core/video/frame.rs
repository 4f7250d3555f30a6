use std::time::Duration;

use image::RgbImage;

use super::error::ScanError;
use super::pixel_buffer::{OwnedPixels, PixelView};

pub const FRAME_CHANNELS: u32 = 3;

/// 帧数据结构（RGB，行主序，可带行填充）
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: OwnedPixels,
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    /// Tightly packed RGB frame.
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, ScanError> {
        let stride = width as usize * FRAME_CHANNELS as usize;
        Self::with_stride(width, height, stride, data, timestamp_ms, frame_number)
    }

    pub fn with_stride(
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Result<Self, ScanError> {
        let pixels = OwnedPixels::new(data, width, height, FRAME_CHANNELS, stride)?;
        Ok(Self {
            pixels,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        })
    }

    pub fn from_rgb_image(img: RgbImage, timestamp_ms: u64, frame_number: u64) -> Result<Self, ScanError> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw(), timestamp_ms, frame_number)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn stride(&self) -> usize {
        self.pixels.stride()
    }

    pub fn pixel_count(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    pub fn pixels(&self) -> PixelView<'_> {
        self.pixels.view()
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp.as_millis() as u64
    }

    pub fn to_rgb_image(&self) -> Result<RgbImage, ScanError> {
        RgbImage::from_raw(self.width(), self.height(), self.pixels.to_packed_vec())
            .ok_or_else(|| ScanError::InvalidBuffer("frame data does not fit RGB image".into()))
    }

    /// Exact-size resample, triangle filtered.
    pub fn resize_to(&self, target_width: u32, target_height: u32) -> Result<Frame, ScanError> {
        if self.width() == 0 || self.height() == 0 || target_width == 0 || target_height == 0 {
            return Err(ScanError::DimensionMismatch {
                expected: (target_width, target_height),
                actual: self.dimensions(),
            });
        }

        let img = self.to_rgb_image()?;
        let resized = image::imageops::resize(
            &img,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );

        Frame::new(
            target_width,
            target_height,
            resized.into_raw(),
            self.timestamp_ms(),
            self.frame_number,
        )
    }
}

/// 帧元数据（轻量级，用于传递信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
    pub frame_number: u64,
}

impl FrameInfo {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            timestamp_ms: frame.timestamp_ms(),
            frame_number: frame.frame_number,
        }
    }

    /// `h:mm:ss:mmm`
    pub fn timecode(&self) -> String {
        let mut timer = self.timestamp_ms;
        let millis = timer % 1000;
        timer /= 1000;
        let seconds = timer % 60;
        timer /= 60;
        let minutes = timer % 60;
        let hours = timer / 60;
        format!("{}:{:02}:{:02}:{:03}", hours, minutes, seconds, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 3];
        let frame = Frame::new(100, 100, data, 1000, 30).unwrap();

        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.stride(), 300);
        assert_eq!(frame.timestamp.as_millis(), 1000);
        assert_eq!(frame.frame_number, 30);
    }

    #[test]
    fn test_frame_rejects_truncated_data() {
        let data = vec![0u8; 100 * 100 * 3 - 1];
        assert!(Frame::new(100, 100, data, 0, 0).is_err());
    }

    #[test]
    fn test_frame_resize() {
        let data = vec![255u8; 100 * 100 * 3];
        let frame = Frame::new(100, 100, data, 40, 2).unwrap();
        let resized = frame.resize_to(32, 24).unwrap();

        assert_eq!(resized.dimensions(), (32, 24));
        assert_eq!(resized.pixels().as_bytes().len(), 32 * 24 * 3);
        assert_eq!(resized.pixels().pixel(10, 10).unwrap(), &[255, 255, 255]);
        assert_eq!(resized.frame_number, 2);
        assert_eq!(resized.timestamp_ms(), 40);
    }

    #[test]
    fn test_padded_frame_resize() {
        // stride 16 for a 4px wide RGB row (12 bytes)
        let data = vec![9u8; 16 * 4];
        let frame = Frame::with_stride(4, 4, 16, data, 0, 0).unwrap();
        let resized = frame.resize_to(8, 8).unwrap();
        assert_eq!(resized.pixels().pixel(7, 7).unwrap(), &[9, 9, 9]);
    }

    #[test]
    fn test_resize_empty_frame_is_mismatch() {
        let frame = Frame::new(0, 0, Vec::new(), 0, 0).unwrap();
        assert!(matches!(
            frame.resize_to(8, 8),
            Err(ScanError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_timecode() {
        let info = FrameInfo {
            width: 1,
            height: 1,
            timestamp_ms: 3_723_045,
            frame_number: 0,
        };
        assert_eq!(info.timecode(), "1:02:03:045");
    }
}
