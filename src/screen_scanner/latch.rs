use std::collections::HashMap;

/// Per-screen state: was the screen matched on the previous frame?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    #[default]
    Idle,
    Active,
}

impl LatchState {
    /// Returns the next state and whether the screen was just entered.
    pub fn transition(self, matched: bool) -> (LatchState, bool) {
        match (self, matched) {
            (LatchState::Idle, true) => (LatchState::Active, true),
            (LatchState::Active, true) => (LatchState::Active, false),
            (LatchState::Active, false) | (LatchState::Idle, false) => (LatchState::Idle, false),
        }
    }
}

/// Edge detector turning per-frame verdicts into "entered" signals.
///
/// Only one frame of history is kept: a single unmatched frame inside a long
/// presentation re-arms the latch. `update` must be called once per tag per
/// frame, in presentation order.
#[derive(Debug, Default)]
pub struct ScreenLatch {
    states: HashMap<String, LatchState>,
}

impl ScreenLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, tag: &str, matched: bool) -> bool {
        let (next, entered) = self.state(tag).transition(matched);
        match self.states.get_mut(tag) {
            Some(state) => *state = next,
            None => {
                self.states.insert(tag.to_string(), next);
            }
        }
        entered
    }

    pub fn state(&self, tag: &str) -> LatchState {
        self.states.get(tag).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }
}
