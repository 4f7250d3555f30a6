//! 屏幕目录：指纹 + 识别区域，按优先级排序
//!
//! Catalogs are authored against one canonical resolution and loaded from
//! JSON5. Every coordinate is checked against that resolution before the first
//! frame; a bad table is fatal.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::video::{Rect, ScanError, TransformStep};
use crate::screen_scanner::fingerprint::{Anchor, ScreenFingerprint};
use crate::screen_scanner::region::Region;

fn default_persist() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDefinition {
    pub fingerprint: ScreenFingerprint,
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Ask the artifact sink to keep a copy of each entry frame.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl ScreenDefinition {
    pub fn new(fingerprint: ScreenFingerprint, regions: Vec<Region>) -> Self {
        Self {
            fingerprint,
            regions,
            persist: true,
        }
    }

    pub fn tag(&self) -> &str {
        &self.fingerprint.tag
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenCatalog {
    pub width: u32,
    pub height: u32,
    /// Highest priority first.
    pub screens: Vec<ScreenDefinition>,
}

static HONKAI_DEFAULT: Lazy<ScreenCatalog> = Lazy::new(build_honkai_default);

const NAME_CONTRAST: f32 = 4.0;
const STIGMATA_CONTRAST: f32 = 4.0;

fn build_honkai_default() -> ScreenCatalog {
    let name_steps = vec![
        TransformStep::Contrast {
            factor: NAME_CONTRAST,
        },
        TransformStep::Invert,
        TransformStep::Grayscale,
    ];
    let stigmata_steps = vec![
        TransformStep::Invert,
        TransformStep::Contrast {
            factor: STIGMATA_CONTRAST,
        },
    ];

    let stigmata = ScreenDefinition::new(
        ScreenFingerprint {
            tag: "Stigmata".to_string(),
            anchors: vec![
                Anchor::new(120, 200, [0xee, 0x9a, 0xff]),
                Anchor::new(990, 864, [0xff, 0xdd, 0x47]),
                Anchor::new(1350, 864, [0xff, 0xdd, 0x47]),
                Anchor::new(1710, 864, [0xff, 0xdd, 0x47]),
                Anchor::new(1280, 974, [0x00, 0xc9, 0xff]),
            ],
            threshold: 0.97,
        },
        vec![
            Region::new("Valkyrie", Rect::new(188, 912, 484, 72), name_steps),
            Region::new("Stigmata", Rect::new(872, 550, 284, 188), stigmata_steps.clone()).with_slot("T"),
            Region::new("Stigmata", Rect::new(1232, 550, 284, 188), stigmata_steps.clone()).with_slot("M"),
            Region::new("Stigmata", Rect::new(1592, 550, 284, 188), stigmata_steps).with_slot("B"),
        ],
    );

    let lineup = ScreenDefinition::new(
        ScreenFingerprint {
            tag: "Lineup".to_string(),
            anchors: vec![
                Anchor::new(1762, 168, [0xff, 0xdd, 0x47]),
                Anchor::new(1762, 390, [0xff, 0xdd, 0x47]),
                Anchor::new(1762, 608, [0xff, 0xdd, 0x47]),
                Anchor::new(181, 97, [0xff, 0xdb, 0x48]),
                Anchor::new(1520, 986, [0x00, 0x5a, 0x7e]),
            ],
            threshold: 0.97,
        },
        Vec::new(),
    );

    ScreenCatalog {
        width: 1920,
        height: 1080,
        screens: vec![stigmata, lineup],
    }
}

impl ScreenCatalog {
    pub fn new(width: u32, height: u32, screens: Vec<ScreenDefinition>) -> Result<Self, ScanError> {
        let catalog = Self {
            width,
            height,
            screens,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Stigmata and lineup screens of Honkai Impact 3rd at 1920x1080.
    pub fn honkai_default() -> Self {
        HONKAI_DEFAULT.clone()
    }

    pub fn from_json5_str(source: &str) -> Result<Self, ScanError> {
        let catalog: ScreenCatalog =
            json5::from_str(source).map_err(|e| ScanError::Configuration(format!("catalog parse error: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let catalog = Self::from_json5_str(&source)?;
        info!(
            "📋 Loaded {} screens ({}x{}) from {}",
            catalog.screens.len(),
            catalog.width,
            catalog.height,
            path.display()
        );
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScanError::Configuration(format!(
                "canonical resolution {}x{} is empty",
                self.width, self.height
            )));
        }

        let mut seen = HashSet::new();
        for screen in &self.screens {
            if !seen.insert(screen.tag()) {
                return Err(ScanError::Configuration(format!(
                    "duplicate screen tag '{}'",
                    screen.tag()
                )));
            }
            screen.fingerprint.validate_within(self.width, self.height)?;
            for region in &screen.regions {
                region.validate_within(self.width, self.height)?;
            }
        }
        Ok(())
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn screens(&self) -> &[ScreenDefinition] {
        &self.screens
    }

    pub fn screen(&self, tag: &str) -> Option<&ScreenDefinition> {
        self.screens.iter().find(|s| s.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honkai_default_is_valid() {
        let catalog = ScreenCatalog::honkai_default();
        catalog.validate().unwrap();
        assert_eq!(catalog.canonical_size(), (1920, 1080));

        let tags: Vec<&str> = catalog.screens().iter().map(|s| s.tag()).collect();
        assert_eq!(tags, vec!["Stigmata", "Lineup"]);

        let stigmata = catalog.screen("Stigmata").unwrap();
        assert_eq!(stigmata.regions.len(), 4);
        assert_eq!(stigmata.regions[0].steps.last(), Some(&TransformStep::Grayscale));
        assert_eq!(stigmata.regions[1].steps.first(), Some(&TransformStep::Invert));
        let slots: Vec<String> = stigmata.regions[1..].iter().map(Region::display_name).collect();
        assert_eq!(slots, vec!["Stigmata (T)", "Stigmata (M)", "Stigmata (B)"]);
        assert!(stigmata.regions[1..].iter().all(|r| r.label == "Stigmata"));
        assert!(catalog.screen("Lineup").unwrap().regions.is_empty());
    }

    #[test]
    fn test_from_json5() {
        let source = r#"
        {
            // 720p test layout
            width: 1280,
            height: 720,
            screens: [
                {
                    fingerprint: {
                        tag: "Armory",
                        anchors: [
                            { x: 10, y: 20, color: [255, 0, 16] },
                        ],
                        threshold: 0.95,
                    },
                    regions: [
                        {
                            label: "Weapon",
                            rect: { x: 100, y: 100, width: 200, height: 40 },
                            steps: [{ op: "invert" }, { op: "contrast", factor: 2.5 }],
                        },
                    ],
                    persist: false,
                },
            ],
        }
        "#;

        let catalog = ScreenCatalog::from_json5_str(source).unwrap();
        let armory = catalog.screen("Armory").unwrap();
        assert_eq!(armory.fingerprint.anchors[0].color, [255, 0, 16]);
        assert_eq!(
            armory.regions[0].steps,
            vec![TransformStep::Invert, TransformStep::Contrast { factor: 2.5 }]
        );
        assert!(!armory.persist);
    }

    #[test]
    fn test_region_outside_resolution_is_fatal() {
        let source = r#"{
            width: 100, height: 100,
            screens: [{
                fingerprint: { tag: "A", anchors: [{ x: 0, y: 0, color: [0, 0, 0] }], threshold: 0.9 },
                regions: [{ label: "Wide", rect: { x: 50, y: 0, width: 51, height: 10 } }],
            }],
        }"#;
        assert!(matches!(
            ScreenCatalog::from_json5_str(source),
            Err(ScanError::Configuration(_))
        ));
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let fp = ScreenFingerprint::new("Twin", vec![Anchor::new(0, 0, [0, 0, 0])], 0.9).unwrap();
        let result = ScreenCatalog::new(
            10,
            10,
            vec![
                ScreenDefinition::new(fp.clone(), Vec::new()),
                ScreenDefinition::new(fp, Vec::new()),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_json5() {
        assert!(matches!(
            ScreenCatalog::from_json5_str("{ width: 10, "),
            Err(ScanError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json5");
        let json = serde_json::to_string(&ScreenCatalog::honkai_default()).unwrap();
        fs::write(&path, json).unwrap();

        assert_eq!(ScreenCatalog::load(&path).unwrap(), ScreenCatalog::honkai_default());
    }
}
