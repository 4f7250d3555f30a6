use std::borrow::Cow;
use std::collections::HashMap;

use log::{debug, info, trace, warn};

use crate::core::video::{
    ArtifactSink, Frame, FrameInfo, FrameSource, NullArtifactSink, PixelView, ScanError,
};
use crate::screen_scanner::catalog::ScreenCatalog;
use crate::screen_scanner::classifier::FrameClassifier;
use crate::screen_scanner::latch::ScreenLatch;
use crate::screen_scanner::recognizer::{RecognitionDispatcher, TextRecognizer};
use crate::screen_scanner::region::RegionExtractor;
use crate::screen_scanner::timeline::{Event, EventTimeline};

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Resize frames that are not at the catalog resolution instead of skipping them.
    pub resample_frames: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            resample_frames: true,
        }
    }
}

impl ScannerConfig {
    /// Only accept frames already at the canonical resolution.
    pub fn strict() -> Self {
        Self {
            resample_frames: false,
        }
    }
}

/// One screen entry produced by `process_frame`.
#[derive(Debug, Clone)]
pub struct ScreenEntry {
    pub screen: String,
    pub frame_info: FrameInfo,
    pub confidence: f32,
    pub fields: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub processed_frames: u64,
    pub skipped_frames: u64,
    pub screen_entries: u64,
}

/// 单线程逐帧扫描器
///
/// Frames must be fed in presentation order, one at a time: the latch only
/// remembers the previous frame. `&mut self` on every entry point keeps a
/// scanner from being driven concurrently; producers that decode in parallel
/// have to serialize frames before they get here.
pub struct ScreenScanner<'r> {
    catalog: ScreenCatalog,
    config: ScannerConfig,
    classifier: FrameClassifier,
    latch: ScreenLatch,
    extractor: RegionExtractor,
    dispatcher: RecognitionDispatcher<'r>,
    artifacts: Box<dyn ArtifactSink + 'r>,
    timeline: EventTimeline,
    entry_counts: HashMap<String, u32>,
    stats: ScanStats,
}

impl<'r> ScreenScanner<'r> {
    pub fn new(catalog: ScreenCatalog, recognizer: &'r dyn TextRecognizer) -> Result<Self, ScanError> {
        Self::with_config(catalog, ScannerConfig::default(), recognizer)
    }

    /// Fails if the catalog is malformed; nothing has been scanned at that point.
    pub fn with_config(
        catalog: ScreenCatalog,
        config: ScannerConfig,
        recognizer: &'r dyn TextRecognizer,
    ) -> Result<Self, ScanError> {
        catalog.validate()?;
        let (width, height) = catalog.canonical_size();

        info!(
            "🎬 ScreenScanner: {} screens at {}x{}",
            catalog.screens().len(),
            width,
            height
        );
        for screen in catalog.screens() {
            info!(
                "{} screen threshold confidence value: {:.6}",
                screen.tag(),
                screen.fingerprint.threshold
            );
        }

        Ok(Self {
            classifier: FrameClassifier::new(width, height),
            catalog,
            config,
            latch: ScreenLatch::new(),
            extractor: RegionExtractor::new(),
            dispatcher: RecognitionDispatcher::new(recognizer),
            artifacts: Box::new(NullArtifactSink),
            timeline: EventTimeline::new(),
            entry_counts: HashMap::new(),
            stats: ScanStats::default(),
        })
    }

    pub fn with_artifact_sink(mut self, sink: Box<dyn ArtifactSink + 'r>) -> Self {
        self.artifacts = sink;
        self
    }

    /// Classify one frame, update the latches and scan the screen on entry.
    ///
    /// On error the frame is rejected before any latch is touched.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<Option<ScreenEntry>, ScanError> {
        let frame = match self.prepare(frame) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.skipped_frames += 1;
                return Err(e);
            }
        };
        let view = frame.pixels();

        let winner = match self.first_match(&view) {
            Ok(winner) => winner,
            Err(e) => {
                self.stats.skipped_frames += 1;
                return Err(e);
            }
        };

        // Screens after the winner count as unmatched for this frame.
        let mut entered = None;
        for (idx, screen) in self.catalog.screens().iter().enumerate() {
            let matched = winner.map(|(w, _)| w == idx).unwrap_or(false);
            if self.latch.update(screen.tag(), matched) {
                entered = winner;
            }
        }
        self.stats.processed_frames += 1;

        match entered {
            Some((idx, confidence)) => Ok(Some(self.scan_screen(idx, &frame, confidence))),
            None => Ok(None),
        }
    }

    /// Pull frames until the source is exhausted. Per-frame failures are logged
    /// and skipped.
    pub fn run<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> ScanStats {
        while let Some(next) = source.next_frame() {
            let frame = match next {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable frame: {}", e);
                    self.stats.skipped_frames += 1;
                    continue;
                }
            };

            if let Err(e) = self.process_frame(&frame) {
                warn!("⚠️ Skipping frame {}: {}", frame.frame_number, e);
            }
        }

        info!(
            "✅ Scan finished: {} frames processed, {} skipped, {} screen entries",
            self.stats.processed_frames, self.stats.skipped_frames, self.stats.screen_entries
        );
        self.stats
    }

    fn prepare<'f>(&self, frame: &'f Frame) -> Result<Cow<'f, Frame>, ScanError> {
        let target = self.classifier.canonical_size();
        if frame.dimensions() == target {
            return Ok(Cow::Borrowed(frame));
        }
        if !self.config.resample_frames {
            return Err(ScanError::DimensionMismatch {
                expected: target,
                actual: frame.dimensions(),
            });
        }

        trace!(
            "Resampling frame {} from {:?} to {:?}",
            frame.frame_number,
            frame.dimensions(),
            target
        );
        Ok(Cow::Owned(frame.resize_to(target.0, target.1)?))
    }

    /// First screen in priority order whose fingerprint matches.
    fn first_match(&self, view: &PixelView<'_>) -> Result<Option<(usize, f32)>, ScanError> {
        for (idx, screen) in self.catalog.screens().iter().enumerate() {
            let result = self.classifier.classify(view, &screen.fingerprint)?;
            trace!("{} confidence {:.4}", result.tag, result.confidence);
            if result.matched {
                return Ok(Some((idx, result.confidence)));
            }
        }
        Ok(None)
    }

    fn scan_screen(&mut self, idx: usize, frame: &Frame, confidence: f32) -> ScreenEntry {
        let screen = &self.catalog.screens()[idx];
        let tag = screen.tag();
        let frame_info = FrameInfo::from_frame(frame);
        let frame_number = frame.frame_number;

        info!(
            "Frame number {} ({}): {} screen (confidence {:.4})",
            frame_number,
            frame_info.timecode(),
            tag,
            confidence
        );
        self.timeline.append(Event::ScreenEntered {
            screen: tag.to_string(),
            frame_number,
        });

        let view = frame.pixels();
        for region in &screen.regions {
            let field = match self.extractor.extract(&view, region) {
                Ok(buffer) => self.dispatcher.recognize(region, &buffer.view()),
                Err(e) => {
                    warn!("⚠️ Could not extract '{}': {}", region.display_name(), e);
                    self.dispatcher.empty_field(region)
                }
            };
            self.timeline.append(Event::FieldRecognized {
                screen: tag.to_string(),
                field,
                frame_number,
            });
        }

        let ordinal = self.entry_counts.entry(tag.to_string()).or_insert(0);
        if screen.persist {
            if let Err(e) = self.artifacts.persist(tag, *ordinal, frame) {
                warn!("⚠️ Could not persist {} frame {}: {}", tag, *ordinal, e);
            }
        }
        *ordinal += 1;
        self.stats.screen_entries += 1;
        debug!("{} entries of {} so far", *ordinal, tag);

        ScreenEntry {
            screen: tag.to_string(),
            frame_info,
            confidence,
            fields: screen.regions.len(),
        }
    }

    pub fn timeline(&self) -> &EventTimeline {
        &self.timeline
    }

    pub fn into_timeline(self) -> EventTimeline {
        self.timeline
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn catalog(&self) -> &ScreenCatalog {
        &self.catalog
    }

    /// Times `tag` has been entered since the last reset.
    pub fn entry_count(&self, tag: &str) -> u32 {
        self.entry_counts.get(tag).copied().unwrap_or(0)
    }

    /// Start a new run: latches, counters, stats and timeline are cleared.
    pub fn reset(&mut self) {
        self.latch.reset();
        self.entry_counts.clear();
        self.stats = ScanStats::default();
        self.timeline = EventTimeline::new();
    }
}
