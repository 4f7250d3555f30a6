//! In-place pixel transforms used to prepare a region for OCR.
//!
//! All functions mutate the caller's buffer and allocate nothing besides the
//! 256-entry lookup table for contrast.

use serde::{Deserialize, Serialize};

use super::pixel_buffer::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformStep {
    Contrast { factor: f32 },
    Invert,
    Grayscale,
}

impl TransformStep {
    pub fn apply<B>(&self, buffer: &mut PixelBuffer<B>)
    where
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        match *self {
            TransformStep::Contrast { factor } => change_contrast(buffer, factor),
            TransformStep::Invert => invert(buffer),
            TransformStep::Grayscale => to_grayscale(buffer),
        }
    }
}

/// Run `steps` in order.
pub fn apply_all<B>(steps: &[TransformStep], buffer: &mut PixelBuffer<B>)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    for step in steps {
        step.apply(buffer);
    }
}

/// Contrast curve anchored at white.
///
/// `value = factor * (in / 255 - 1) + 1`, then `out = trunc((value + 0.5) * 255)`
/// clamped to `0..=255`. The `+ 0.5` lifts the curve by half the range, so even
/// a factor of 1.0 brightens: 0 maps to 127 and anything from 128 up saturates.
/// With factor 4 the ramp spans inputs 160..=223.
pub fn change_contrast<B>(buffer: &mut PixelBuffer<B>, factor: f32)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let lut = contrast_lut(factor);
    buffer.for_each_pixel_mut(|px| {
        for channel in px.iter_mut() {
            *channel = lut[*channel as usize];
        }
    });
}

fn contrast_lut(factor: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (input, out) in lut.iter_mut().enumerate() {
        let value = factor * (input as f32 / 255.0 - 1.0) + 1.0;
        *out = (((value + 0.5) * 255.0) as i32).clamp(0, 255) as u8;
    }
    lut
}

pub fn invert<B>(buffer: &mut PixelBuffer<B>)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    buffer.for_each_pixel_mut(|px| {
        for channel in px.iter_mut() {
            *channel = 255 - *channel;
        }
    });
}

/// BT.601 luma written back to all three channels. Buffers with fewer than
/// three channels are already gray and are left alone.
pub fn to_grayscale<B>(buffer: &mut PixelBuffer<B>)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    if buffer.channels() < 3 {
        return;
    }
    buffer.for_each_pixel_mut(|px| {
        let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
        let value = luma.round().clamp(0.0, 255.0) as u8;
        px[0] = value;
        px[1] = value;
        px[2] = value;
    });
}
