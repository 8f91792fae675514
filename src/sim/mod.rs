//! Deterministic simulation module
//!
//! All match logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering, audio or UI; those are reported as `MatchEvent`s

pub mod collision;
pub mod countdown;
pub mod curve;
pub mod layout;
pub mod riser;
pub mod state;
pub mod tick;
pub mod time;

pub use countdown::{CountdownPhase, WinCountdown};
pub use curve::{CatchUp, CatchUpTuning, CurveError, CurveKey, DifficultyCurve, DifficultyEvaluator};
pub use layout::{
    LayoutError, LevelGenerator, LevelLayout, PlacedSection, SectionDatabase, SectionTemplate,
    SpawnPoint,
};
pub use riser::{RiseRate, Riser, Risers};
pub use state::{
    Actor, ActorId, ActorKind, ActorRegistry, Match, MatchError, MatchEvent, MatchResult,
    MatchState, Music, Page,
};
pub use tick::{TickInput, tick};
pub use time::TimeScaleStack;
