//! 带边界检查的像素视图
//!
//! `PixelBuffer` bundles the raw bytes with width, height, channel count and row
//! stride, so crops and transforms can never touch memory outside the declared
//! rectangle. The container decides ownership: `&[u8]` for borrowed views,
//! `Vec<u8>` for owned crops.

use serde::{Deserialize, Serialize};

use super::error::ScanError;

/// Axis-aligned rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, bound_width: u32, bound_height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= bound_width && b <= bound_height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<B> {
    data: B,
    width: u32,
    height: u32,
    channels: u32,
    stride: usize,
}

pub type PixelView<'a> = PixelBuffer<&'a [u8]>;
pub type OwnedPixels = PixelBuffer<Vec<u8>>;

fn required_len(width: u32, height: u32, channels: u32, stride: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    stride * (height as usize - 1) + width as usize * channels as usize
}

impl<B: AsRef<[u8]>> PixelBuffer<B> {
    pub fn new(
        data: B,
        width: u32,
        height: u32,
        channels: u32,
        stride: usize,
    ) -> Result<Self, ScanError> {
        if channels == 0 {
            return Err(ScanError::InvalidBuffer("channel count must be > 0".into()));
        }
        let row_bytes = width as usize * channels as usize;
        if stride < row_bytes {
            return Err(ScanError::InvalidBuffer(format!(
                "stride {} smaller than row width {} bytes",
                stride, row_bytes
            )));
        }
        let needed = required_len(width, height, channels, stride);
        let len = data.as_ref().len();
        if len < needed {
            return Err(ScanError::InvalidBuffer(format!(
                "buffer holds {} bytes, {}x{}x{} with stride {} needs {}",
                len, width, height, channels, stride, needed
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw backing bytes, row padding included.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.data.as_ref().get(start..start + self.row_bytes())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width {
            return None;
        }
        let channels = self.channels as usize;
        let start = x as usize * channels;
        self.row(y).map(|row| &row[start..start + channels])
    }

    pub fn view(&self) -> PixelView<'_> {
        PixelBuffer {
            data: self.data.as_ref(),
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.stride,
        }
    }

    /// Borrow a sub-rectangle without copying. The view keeps the parent stride.
    pub fn crop(&self, rect: Rect) -> Result<PixelView<'_>, ScanError> {
        if !rect.fits_within(self.width, self.height) {
            return Err(ScanError::RegionOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                bound_width: self.width,
                bound_height: self.height,
            });
        }

        let bytes = self.data.as_ref();
        let data = if rect.is_empty() {
            &bytes[0..0]
        } else {
            let offset = rect.y as usize * self.stride + rect.x as usize * self.channels as usize;
            let len = required_len(rect.width, rect.height, self.channels, self.stride);
            &bytes[offset..offset + len]
        };

        Ok(PixelBuffer {
            data,
            width: rect.width,
            height: rect.height,
            channels: self.channels,
            stride: self.stride,
        })
    }

    /// Copy the pixels into a tightly packed vector (stride == width * channels).
    pub fn to_packed_vec(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(self.row_bytes() * self.height as usize);
        for y in 0..self.height {
            if let Some(row) = self.row(y) {
                packed.extend_from_slice(row);
            }
        }
        packed
    }

    pub fn to_packed(&self) -> OwnedPixels {
        PixelBuffer {
            data: self.to_packed_vec(),
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.row_bytes(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> PixelBuffer<B> {
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        let row_bytes = self.row_bytes();
        self.data.as_mut().get_mut(start..start + row_bytes)
    }

    /// Visit every pixel in place. Padding bytes between rows are never touched.
    pub fn for_each_pixel_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut [u8]),
    {
        let channels = self.channels as usize;
        for y in 0..self.height {
            if let Some(row) = self.row_mut(y) {
                row.chunks_exact_mut(channels).for_each(&mut f);
            }
        }
    }
}

impl OwnedPixels {
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, stride: usize) -> Vec<u8> {
        let mut data = vec![0xAAu8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let idx = y * stride + x * 3;
                data[idx] = x as u8;
                data[idx + 1] = y as u8;
                data[idx + 2] = 7;
            }
        }
        data
    }

    #[test]
    fn test_rejects_short_stride() {
        let result = PixelBuffer::new(vec![0u8; 100], 10, 2, 3, 20);
        assert!(matches!(result, Err(ScanError::InvalidBuffer(_))));
    }

    #[test]
    fn test_rejects_short_buffer() {
        let result = PixelBuffer::new(vec![0u8; 59], 10, 2, 3, 30);
        assert!(matches!(result, Err(ScanError::InvalidBuffer(_))));
    }

    #[test]
    fn test_last_row_needs_no_padding() {
        // 2 rows, stride 40, row payload 30: 40 + 30 bytes is enough
        let buffer = PixelBuffer::new(vec![0u8; 70], 10, 2, 3, 40).unwrap();
        assert_eq!(buffer.row(1).unwrap().len(), 30);
        assert!(buffer.row(2).is_none());
    }

    #[test]
    fn test_crop_reads_through_stride() {
        let data = gradient(8, 6, 32);
        let buffer = PixelBuffer::new(data, 8, 6, 3, 32).unwrap();

        let crop = buffer.crop(Rect::new(2, 3, 4, 2)).unwrap();
        assert_eq!(crop.dimensions(), (4, 2));
        assert_eq!(crop.pixel(0, 0).unwrap(), &[2, 3, 7]);
        assert_eq!(crop.pixel(3, 1).unwrap(), &[5, 4, 7]);
        assert!(crop.pixel(4, 0).is_none());
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let buffer = PixelBuffer::new(vec![0u8; 8 * 6 * 3], 8, 6, 3, 24).unwrap();
        let err = buffer.crop(Rect::new(6, 0, 4, 1)).unwrap_err();
        assert!(matches!(err, ScanError::RegionOutOfBounds { .. }));
        assert!(buffer.crop(Rect::new(u32::MAX, 0, 2, 1)).is_err());
    }

    #[test]
    fn test_to_packed_drops_padding() {
        let data = gradient(4, 3, 16);
        let buffer = PixelBuffer::new(data, 4, 3, 3, 16).unwrap();
        let packed = buffer.to_packed();

        assert_eq!(packed.stride(), 12);
        assert_eq!(packed.as_bytes().len(), 36);
        assert!(!packed.as_bytes().contains(&0xAA));
        assert_eq!(packed.pixel(3, 2).unwrap(), &[3, 2, 7]);
    }

    #[test]
    fn test_for_each_pixel_mut_skips_padding() {
        let mut buffer = PixelBuffer::new(vec![0xAAu8; 2 * 10], 2, 2, 3, 10).unwrap();
        buffer.for_each_pixel_mut(|px| px.fill(1));

        let bytes = buffer.as_bytes();
        assert_eq!(&bytes[0..6], &[1; 6]);
        assert_eq!(&bytes[6..10], &[0xAA; 4]);
        assert_eq!(&bytes[10..16], &[1; 6]);
    }
}
