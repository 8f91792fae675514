//! Keyed time-scale overrides (hit-stop, slow motion, pause)
//!
//! Each system pushes its own scale under a key; the slowest one wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TimeScaleEntry {
    key: String,
    scale: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeScaleStack {
    entries: Vec<TimeScaleEntry>,
}

impl TimeScaleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, scale: f32) {
        self.entries.push(TimeScaleEntry {
            key: key.to_string(),
            scale: scale.max(0.0),
        });
    }

    /// Remove the oldest entry under `key`. Returns false if none was found.
    pub fn pop(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|e| e.key == key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pop `key` if present, otherwise push it
    pub fn toggle(&mut self, key: &str, scale: f32) {
        if !self.pop(key) {
            self.push(key, scale);
        }
    }

    pub fn toggle_pause(&mut self, key: &str) {
        self.toggle(key, 0.0);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Effective scale: minimum of all entries, 1.0 when empty
    pub fn scale(&self) -> f32 {
        self.entries
            .iter()
            .map(|e| e.scale)
            .fold(None, |min: Option<f32>, s| Some(min.map_or(s, |m| m.min(s))))
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack_is_realtime() {
        assert_eq!(TimeScaleStack::new().scale(), 1.0);
    }

    #[test]
    fn test_slowest_entry_wins() {
        let mut stack = TimeScaleStack::new();
        stack.push("hitstop", 0.1);
        stack.push("slowmo", 0.5);
        assert_eq!(stack.scale(), 0.1);
        assert!(stack.pop("hitstop"));
        assert_eq!(stack.scale(), 0.5);
        assert!(!stack.pop("hitstop"));
    }

    #[test]
    fn test_toggle_pause() {
        let mut stack = TimeScaleStack::new();
        stack.toggle_pause("menu");
        assert_eq!(stack.scale(), 0.0);
        stack.toggle_pause("menu");
        assert_eq!(stack.scale(), 1.0);
    }

    #[test]
    fn test_scale_above_one_is_allowed() {
        let mut stack = TimeScaleStack::new();
        stack.push("fast", 2.0);
        assert_eq!(stack.scale(), 2.0);
        stack.clear();
        assert_eq!(stack.scale(), 1.0);
    }
}
