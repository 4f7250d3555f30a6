use serde::{Deserialize, Serialize};

use crate::core::video::ScanError;

/// One sample point: absolute pixel coordinate plus expected RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: u32,
    pub y: u32,
    pub color: [u8; 3],
}

impl Anchor {
    pub const fn new(x: u32, y: u32, color: [u8; 3]) -> Self {
        Self { x, y, color }
    }
}

/// 屏幕指纹：稀疏锚点 + 置信度阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFingerprint {
    pub tag: String,
    pub anchors: Vec<Anchor>,
    pub threshold: f32,
}

impl ScreenFingerprint {
    pub fn new(tag: impl Into<String>, anchors: Vec<Anchor>, threshold: f32) -> Result<Self, ScanError> {
        let fingerprint = Self {
            tag: tag.into(),
            anchors,
            threshold,
        };
        fingerprint.validate()?;
        Ok(fingerprint)
    }

    /// Checks that do not depend on the canonical resolution.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.tag.trim().is_empty() {
            return Err(ScanError::Configuration("fingerprint tag is empty".into()));
        }
        if self.anchors.is_empty() {
            return Err(ScanError::Configuration(format!(
                "fingerprint '{}' has no anchors",
                self.tag
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ScanError::Configuration(format!(
                "fingerprint '{}' threshold {} outside [0, 1]",
                self.tag, self.threshold
            )));
        }
        Ok(())
    }

    pub fn validate_within(&self, width: u32, height: u32) -> Result<(), ScanError> {
        self.validate()?;
        if let Some(anchor) = self.anchors.iter().find(|a| a.x >= width || a.y >= height) {
            return Err(ScanError::Configuration(format!(
                "fingerprint '{}' anchor ({}, {}) outside {}x{}",
                self.tag, anchor.x, anchor.y, width, height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_anchor_set() {
        assert!(ScreenFingerprint::new("Empty", Vec::new(), 0.9).is_err());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let anchors = vec![Anchor::new(0, 0, [0, 0, 0])];
        assert!(ScreenFingerprint::new("High", anchors.clone(), 1.01).is_err());
        assert!(ScreenFingerprint::new("Nan", anchors.clone(), f32::NAN).is_err());
        assert!(ScreenFingerprint::new("Edge", anchors, 1.0).is_ok());
    }

    #[test]
    fn test_anchor_bounds() {
        let fp = ScreenFingerprint::new("Lineup", vec![Anchor::new(1919, 1079, [0, 0, 0])], 0.97).unwrap();
        assert!(fp.validate_within(1920, 1080).is_ok());
        assert!(fp.validate_within(1280, 720).is_err());
    }
}
