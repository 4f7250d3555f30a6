use crate::core::video::{PixelView, ScanError};
use crate::screen_scanner::fingerprint::{Anchor, ScreenFingerprint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult<'a> {
    pub tag: &'a str,
    pub confidence: f32,
    pub matched: bool,
}

/// Scores frames against fingerprints authored for one canonical resolution.
///
/// Frames must already be resampled to that resolution; anything else is a
/// `DimensionMismatch`.
#[derive(Debug, Clone, Copy)]
pub struct FrameClassifier {
    width: u32,
    height: u32,
}

impl FrameClassifier {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn classify<'a>(
        &self,
        frame: &PixelView<'_>,
        fingerprint: &'a ScreenFingerprint,
    ) -> Result<ClassificationResult<'a>, ScanError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(ScanError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: frame.dimensions(),
            });
        }

        let confidence = Self::confidence(frame, &fingerprint.anchors)?;
        Ok(ClassificationResult {
            tag: &fingerprint.tag,
            confidence,
            matched: confidence >= fingerprint.threshold,
        })
    }

    /// `1 - Σ |Δ| / (3 * n)` where `Δ` holds the three per-channel deltas
    /// `2 * (255 + observed - expected) / 510 - 1` of one anchor.
    pub fn confidence(frame: &PixelView<'_>, anchors: &[Anchor]) -> Result<f32, ScanError> {
        if anchors.is_empty() {
            return Ok(0.0);
        }
        if frame.channels() < 3 {
            return Err(ScanError::InvalidBuffer(format!(
                "classification needs RGB pixels, got {} channels",
                frame.channels()
            )));
        }

        let norm = 3.0 * anchors.len() as f32;
        let mut dissimilarity = 0.0f32;
        for anchor in anchors {
            let observed = frame.pixel(anchor.x, anchor.y).ok_or(ScanError::RegionOutOfBounds {
                x: anchor.x,
                y: anchor.y,
                width: 1,
                height: 1,
                bound_width: frame.width(),
                bound_height: frame.height(),
            })?;

            let squared: f32 = observed
                .iter()
                .zip(anchor.color.iter())
                .map(|(&seen, &want)| {
                    let delta = 2.0 * (255.0 + seen as f32 - want as f32) / 510.0 - 1.0;
                    delta * delta
                })
                .sum();
            dissimilarity += squared.sqrt() / norm;
        }

        Ok((1.0 - dissimilarity).clamp(0.0, 1.0))
    }
}
