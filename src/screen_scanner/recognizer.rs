use std::sync::atomic::{AtomicUsize, Ordering};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::video::{PixelView, ScanError};
use crate::screen_scanner::region::Region;

/// External OCR engine. Gets a prepared buffer, returns raw UTF-8 text.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &PixelView<'_>) -> Result<String, ScanError>;
}

/// Text bound to the semantic label of the region it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedField {
    pub label: String,
    pub text: String,
}

/// Newlines become spaces, then the ends are trimmed.
pub fn normalize_text(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// One recognition attempt per region. A failing engine yields an empty field.
pub struct RecognitionDispatcher<'r> {
    recognizer: &'r dyn TextRecognizer,
}

impl<'r> RecognitionDispatcher<'r> {
    pub fn new(recognizer: &'r dyn TextRecognizer) -> Self {
        Self { recognizer }
    }

    /// The field carries the region's label; logs name the slot as well.
    pub fn recognize(&self, region: &Region, buffer: &PixelView<'_>) -> RecognizedField {
        let name = region.display_name();
        let text = match self.recognizer.recognize(buffer) {
            Ok(raw) => normalize_text(&raw),
            Err(e) => {
                warn!("⚠️ Recognition failed for '{}': {}", name, e);
                String::new()
            }
        };
        info!("{}: {}", name, text);

        RecognizedField {
            label: region.label.clone(),
            text,
        }
    }

    /// Placeholder for a region that never reached the engine.
    pub fn empty_field(&self, region: &Region) -> RecognizedField {
        RecognizedField {
            label: region.label.clone(),
            text: String::new(),
        }
    }
}

type RecognizeFn = Box<dyn Fn(&PixelView<'_>) -> Result<String, ScanError> + Send + Sync>;

pub struct MockTextRecognizer {
    responder: Option<RecognizeFn>,
    calls: AtomicUsize,
}

impl MockTextRecognizer {
    /// Always answers with empty text.
    pub fn new() -> Self {
        Self {
            responder: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(&PixelView<'_>) -> Result<String, ScanError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(pattern)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers each call with the next text, then empty strings.
    pub fn with_fixed_texts(texts: Vec<String>) -> Self {
        let cursor = AtomicUsize::new(0);
        Self::with_pattern(move |_| {
            let idx = cursor.fetch_add(1, Ordering::SeqCst);
            Ok(texts.get(idx).cloned().unwrap_or_default())
        })
    }

    pub fn failing() -> Self {
        Self::with_pattern(|_| Err(ScanError::Recognition("mock engine offline".into())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTextRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for MockTextRecognizer {
    fn recognize(&self, image: &PixelView<'_>) -> Result<String, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.responder {
            Some(respond) => respond(image),
            None => Ok(String::new()),
        }
    }
}
