//! Match tuning
//!
//! Loaded from JSON; every field falls back to its default when omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::curve::{CatchUpTuning, DifficultyCurve};
use crate::sim::state::MatchState;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Everything that shapes a match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Run seed for layout and spawn picks
    pub seed: u64,
    /// State entered on startup
    pub initial_state: MatchState,
    /// Sections stitched into each level
    pub section_count: usize,
    /// Local player slots
    pub max_players: u32,

    // === Countdown ===
    /// Seconds the last survivor must hold out
    pub countdown_duration: f32,

    // === Risers ===
    pub hazard_origin: f32,
    pub camera_origin: f32,
    /// Base rise rate keyed on camera height
    pub difficulty: DifficultyCurve,
    pub catch_up: CatchUpTuning,

    // === Worms ===
    pub worm_contact_radius: f32,
    pub worm_transform_duration: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            seed: 0x6c61_7661,
            initial_state: MatchState::Intro,
            section_count: SECTION_COUNT,
            max_players: MAX_PLAYERS,

            countdown_duration: COUNTDOWN_DURATION,

            hazard_origin: HAZARD_ORIGIN,
            camera_origin: CAMERA_ORIGIN,
            difficulty: DifficultyCurve::default(),
            catch_up: CatchUpTuning::default(),

            worm_contact_radius: WORM_CONTACT_RADIUS,
            worm_transform_duration: WORM_TRANSFORM_DURATION,
        }
    }
}

impl MatchSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), SettingsError> {
            Err(SettingsError::Invalid { field, reason })
        }

        if self.section_count == 0 {
            return invalid("section_count", "must be at least 1");
        }
        if self.max_players == 0 {
            return invalid("max_players", "must be at least 1");
        }
        if !(self.countdown_duration.is_finite() && self.countdown_duration >= 0.0) {
            return invalid("countdown_duration", "must be a non-negative number");
        }
        if !(self.hazard_origin.is_finite() && self.camera_origin.is_finite()) {
            return invalid("hazard_origin", "riser origins must be finite");
        }
        if !(self.worm_contact_radius.is_finite() && self.worm_contact_radius >= 0.0) {
            return invalid("worm_contact_radius", "must be a non-negative number");
        }
        if !(self.worm_transform_duration.is_finite() && self.worm_transform_duration >= 0.0) {
            return invalid("worm_transform_duration", "must be a non-negative number");
        }
        let catch_up = &self.catch_up;
        if !(catch_up.view_height.is_finite() && catch_up.view_height > 0.0) {
            return invalid("catch_up.view_height", "must be positive");
        }
        if !(0.0..=1.0).contains(&catch_up.smoothing) {
            return invalid("catch_up.smoothing", "must be within 0..=1");
        }
        if !(catch_up.pace.is_finite() && catch_up.pace >= 0.0) {
            return invalid("catch_up.pace", "must be a non-negative number");
        }
        Ok(())
    }
}
