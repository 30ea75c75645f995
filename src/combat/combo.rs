use serde::{Deserialize, Serialize};

use crate::constants::COMBO_WINDOW_SECS;

/// Rolling hit counter for cosmetic feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboCounter {
    pub count: u32,
    pub timer: f32,
    pub window: f32,
}

impl Default for ComboCounter {
    fn default() -> Self {
        Self::new(COMBO_WINDOW_SECS)
    }
}

impl ComboCounter {
    pub fn new(window: f32) -> Self {
        Self {
            count: 0,
            timer: 0.0,
            window,
        }
    }

    /// Add `hits` and restart the decay window. Zero hits change nothing.
    pub fn bump(&mut self, hits: u32) {
        if hits == 0 {
            return;
        }
        self.count += hits;
        self.timer = self.window;
    }

    pub fn update(&mut self, dt: f32) {
        self.timer = (self.timer - dt).max(0.0);
        if self.timer <= 0.0 {
            self.count = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_inside_window_accumulate() {
        let mut combo = ComboCounter::default();
        combo.bump(2);
        combo.update(1.0);
        combo.bump(1);
        combo.update(2.0);
        combo.bump(3);
        assert_eq!(combo.count, 6);
    }

    #[test]
    fn test_gap_resets() {
        let mut combo = ComboCounter::default();
        combo.bump(4);
        combo.update(2.5);
        assert_eq!(combo.count, 0);
    }

    #[test]
    fn test_zero_hits_do_not_refresh() {
        let mut combo = ComboCounter::default();
        combo.bump(1);
        combo.update(2.0);
        combo.bump(0);
        combo.update(0.5);
        assert_eq!(combo.count, 0);
    }
}
