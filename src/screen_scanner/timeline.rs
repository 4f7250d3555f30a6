//! 事件时间线
//!
//! The timeline is the only output of a scan: an append-only list of events in
//! the order they were emitted. Nothing is removed or rewritten.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::video::ScanError;
use crate::screen_scanner::recognizer::RecognizedField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    ScreenEntered {
        screen: String,
        frame_number: u64,
    },
    FieldRecognized {
        screen: String,
        field: RecognizedField,
        frame_number: u64,
    },
}

impl Event {
    pub fn frame_number(&self) -> u64 {
        match self {
            Event::ScreenEntered { frame_number, .. } | Event::FieldRecognized { frame_number, .. } => {
                *frame_number
            }
        }
    }

    pub fn screen(&self) -> &str {
        match self {
            Event::ScreenEntered { screen, .. } | Event::FieldRecognized { screen, .. } => screen,
        }
    }
}

/// Plain-text line: `[STIGMATA_SCREEN]` for entries, `Label=text` for fields.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ScreenEntered { screen, .. } => {
                let tag: String = screen
                    .chars()
                    .map(|c| if c.is_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
                    .collect();
                write!(f, "[{}_SCREEN]", tag)
            }
            Event::FieldRecognized { field, .. } => write!(f, "{}={}", field.label, field.text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTimeline {
    events: Vec<Event>,
}

impl EventTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events in emission order. Can be called any number of times.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn entries_for<'a>(&'a self, screen: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events
            .iter()
            .filter(move |e| matches!(e, Event::ScreenEntered { screen: s, .. } if s == screen))
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn to_json(&self) -> Result<String, ScanError> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl<'a> IntoIterator for &'a EventTimeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EventTimeline {
        let mut timeline = EventTimeline::new();
        timeline.append(Event::ScreenEntered {
            screen: "Stigmata".into(),
            frame_number: 12,
        });
        timeline.append(Event::FieldRecognized {
            screen: "Stigmata".into(),
            field: RecognizedField {
                label: "Valkyrie".into(),
                text: "Kiana Kaslana".into(),
            },
            frame_number: 12,
        });
        timeline.append(Event::ScreenEntered {
            screen: "Lineup".into(),
            frame_number: 40,
        });
        timeline
    }

    #[test]
    fn test_iteration_is_ordered_and_restartable() {
        let timeline = sample();
        let first: Vec<u64> = timeline.iter().map(Event::frame_number).collect();
        let second: Vec<u64> = (&timeline).into_iter().map(Event::frame_number).collect();
        assert_eq!(first, vec![12, 12, 40]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_lines() {
        assert_eq!(
            sample().render_lines(),
            vec!["[STIGMATA_SCREEN]", "Valkyrie=Kiana Kaslana", "[LINEUP_SCREEN]"]
        );
    }

    #[test]
    fn test_entries_for() {
        let timeline = sample();
        assert_eq!(timeline.entries_for("Stigmata").count(), 1);
        assert_eq!(timeline.entries_for("Abyss").count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "screen_entered");
        assert_eq!(value[1]["kind"], "field_recognized");
        assert_eq!(value[1]["field"]["label"], "Valkyrie");
        assert_eq!(value[2]["frame_number"], 40);
    }
}
