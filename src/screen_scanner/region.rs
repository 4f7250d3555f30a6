use serde::{Deserialize, Serialize};

use crate::core::video::transform::apply_all;
use crate::core::video::{OwnedPixels, PixelView, Rect, ScanError, TransformStep};

/// A field of a screen that gets sent to OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub label: String,
    /// Tells apart regions sharing a label, e.g. the T/M/B stigmata slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    pub rect: Rect,
    #[serde(default)]
    pub steps: Vec<TransformStep>,
}

impl Region {
    pub fn new(label: impl Into<String>, rect: Rect, steps: Vec<TransformStep>) -> Self {
        Self {
            label: label.into(),
            slot: None,
            rect,
            steps,
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// `Stigmata (T)` when a slot is set, the bare label otherwise.
    pub fn display_name(&self) -> String {
        match &self.slot {
            Some(slot) => format!("{} ({})", self.label, slot),
            None => self.label.clone(),
        }
    }

    pub fn validate_within(&self, width: u32, height: u32) -> Result<(), ScanError> {
        if self.rect.is_empty() {
            return Err(ScanError::Configuration(format!(
                "region '{}' has zero size",
                self.label
            )));
        }
        if !self.rect.fits_within(width, height) {
            let r = self.rect;
            return Err(ScanError::Configuration(format!(
                "region '{}' ({}, {}, {}x{}) outside {}x{}",
                self.label, r.x, r.y, r.width, r.height, width, height
            )));
        }
        if let Some(TransformStep::Contrast { factor }) = self
            .steps
            .iter()
            .find(|s| matches!(s, TransformStep::Contrast { factor } if !factor.is_finite()))
        {
            return Err(ScanError::Configuration(format!(
                "region '{}' has non-finite contrast factor {}",
                self.label, factor
            )));
        }
        Ok(())
    }
}

/// Crops a region out of a borrowed frame and runs its transforms.
///
/// The frame is never written to: the crop is copied once into a packed
/// buffer and every step then works on that copy in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionExtractor;

impl RegionExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, frame: &PixelView<'_>, region: &Region) -> Result<OwnedPixels, ScanError> {
        let mut buffer = frame.crop(region.rect)?.to_packed();
        apply_all(&region.steps, &mut buffer);
        Ok(buffer)
    }
}
