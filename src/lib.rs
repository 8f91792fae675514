//! Gum Lava - match flow for a rising-lava party platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (match state, risers, countdown, level layout)
//! - `platform`: Host boundary (presentation callbacks, event dispatch)
//! - `settings`: Data-driven match tuning

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{MatchSettings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (the game targets 60 fps)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Re-rolls allowed per layout slot before a repeated template is accepted
    pub const MAX_RESAMPLE_ATTEMPTS: u32 = 100;

    /// Seconds the last survivor has to stay alive to win
    pub const COUNTDOWN_DURATION: f32 = 10.0;
    /// Sections stitched into a level
    pub const SECTION_COUNT: usize = 5;
    /// Local players supported by the party mode
    pub const MAX_PLAYERS: u32 = 4;

    /// Lava plane starts just below the start section floor
    pub const HAZARD_ORIGIN: f32 = -2.0;
    /// Camera anchor starts centred on the start section
    pub const CAMERA_ORIGIN: f32 = 6.0;

    /// Worm-to-player touch distance
    pub const WORM_CONTACT_RADIUS: f32 = 0.75;
    /// Seconds a worm takes to turn back into a player
    pub const WORM_TRANSFORM_DURATION: f32 = 1.5;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of `lerp`, clamped to [0, 1]. Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Frame-rate independent exponential damping toward `target`.
///
/// `smoothing` is the fraction of the gap left after one second (0..1).
#[inline]
pub fn damp(current: f32, target: f32, smoothing: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - smoothing.clamp(0.0, 1.0).powf(dt.max(0.0)))
}
