//! Rising planes: the lava hazard and the camera anchor
//!
//! Both risers advance from one shared `RiseRate` per tick and share one
//! climbed offset, so the hazard and the view cannot drift apart.

use serde::{Deserialize, Serialize};

/// Units per second, computed once per tick and fed to every riser
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct RiseRate(f32);

impl RiseRate {
    pub const ZERO: RiseRate = RiseRate(0.0);

    /// Negative and NaN rates clamp to zero
    pub fn new(units_per_sec: f32) -> Self {
        if units_per_sec.is_nan() {
            Self::ZERO
        } else {
            Self(units_per_sec.max(0.0))
        }
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

/// A scalar height that climbs while active
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Riser {
    origin: f32,
    height: f32,
    rising: bool,
}

impl Riser {
    pub fn new(origin: f32) -> Self {
        Self {
            origin,
            height: origin,
            rising: false,
        }
    }

    pub fn start_rising(&mut self) {
        self.rising = true;
    }

    pub fn stop_rising(&mut self) {
        self.rising = false;
    }

    /// Stop and snap back to `origin`, which becomes the new stored origin
    pub fn reset(&mut self, origin: f32) {
        self.stop_rising();
        self.origin = origin;
        self.height = origin;
    }

    pub fn tick(&mut self, dt: f32, rate: RiseRate) {
        if self.rising {
            self.height += rate.get() * dt.max(0.0);
        }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn origin(&self) -> f32 {
        self.origin
    }

    #[inline]
    pub fn is_rising(&self) -> bool {
        self.rising
    }
}

/// Hazard plane and camera anchor, always driven together.
///
/// Both heights are their origin plus one shared offset, so they stay in
/// exact lockstep however long the match runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risers {
    hazard_origin: f32,
    camera_origin: f32,
    offset: Riser,
}

impl Risers {
    pub fn new(hazard_origin: f32, camera_origin: f32) -> Self {
        Self {
            hazard_origin,
            camera_origin,
            offset: Riser::new(0.0),
        }
    }

    pub fn start_rising(&mut self) {
        self.offset.start_rising();
    }

    pub fn stop_rising(&mut self) {
        self.offset.stop_rising();
    }

    pub fn reset(&mut self, hazard_origin: f32, camera_origin: f32) {
        self.hazard_origin = hazard_origin;
        self.camera_origin = camera_origin;
        self.offset.reset(0.0);
    }

    /// Broadcast one rate to both planes
    pub fn advance(&mut self, rate: RiseRate, dt: f32) {
        self.offset.tick(dt, rate);
    }

    /// Distance both planes have climbed since the last reset
    #[inline]
    pub fn risen(&self) -> f32 {
        self.offset.height()
    }

    #[inline]
    pub fn hazard_height(&self) -> f32 {
        self.hazard_origin + self.risen()
    }

    #[inline]
    pub fn camera_height(&self) -> f32 {
        self.camera_origin + self.risen()
    }

    #[inline]
    pub fn is_rising(&self) -> bool {
        self.offset.is_rising()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_idle_riser_does_not_move() {
        let mut riser = Riser::new(2.0);
        riser.tick(1.0, RiseRate::new(5.0));
        assert_eq!(riser.height(), 2.0);
    }

    #[test]
    fn test_stop_holds_height() {
        let mut riser = Riser::new(0.0);
        riser.start_rising();
        riser.tick(1.0, RiseRate::new(0.5));
        riser.stop_rising();
        riser.tick(1.0, RiseRate::new(0.5));
        assert_eq!(riser.height(), 0.5);
    }

    #[test]
    fn test_negative_rate_clamps() {
        assert_eq!(RiseRate::new(-1.0), RiseRate::ZERO);
        assert_eq!(RiseRate::new(f32::NAN), RiseRate::ZERO);
    }

    #[test]
    fn test_pair_stays_in_lockstep() {
        let mut risers = Risers::new(-2.0, 6.0);
        risers.start_rising();
        // Ten minutes at 60 fps
        for _ in 0..36_000 {
            risers.advance(RiseRate::new(0.6), 1.0 / 60.0);
        }
        assert_eq!(risers.hazard_height(), -2.0 + risers.risen());
        assert_eq!(risers.camera_height(), 6.0 + risers.risen());
        assert!(risers.risen() > 300.0);
    }

    #[test]
    fn test_pair_reset_moves_origins() {
        let mut risers = Risers::new(-2.0, 6.0);
        risers.start_rising();
        risers.advance(RiseRate::new(1.0), 3.0);
        risers.reset(0.0, 10.0);
        assert!(!risers.is_rising());
        assert_eq!(risers.risen(), 0.0);
        assert_eq!(risers.hazard_height(), 0.0);
        assert_eq!(risers.camera_height(), 10.0);
    }

    proptest! {
        #[test]
        fn prop_height_is_origin_plus_rate_times_time(
            origin in -50.0f32..50.0,
            rate in 0.0f32..5.0,
            dt1 in 0.0f32..2.0,
            dt2 in 0.0f32..2.0,
        ) {
            let mut riser = Riser::new(origin);
            riser.start_rising();
            riser.tick(dt1, RiseRate::new(rate));
            riser.tick(dt2, RiseRate::new(rate));
            let expected = origin + rate * (dt1 + dt2);
            prop_assert!((riser.height() - expected).abs() < 1e-3);

            riser.reset(origin);
            prop_assert_eq!(riser.height(), origin);
            prop_assert!(!riser.is_rising());
        }

        #[test]
        fn prop_height_never_decreases_while_rising(
            rate in 0.0f32..5.0,
            dts in proptest::collection::vec(-1.0f32..1.0, 1..32),
        ) {
            let mut riser = Riser::new(0.0);
            riser.start_rising();
            let mut last = riser.height();
            for dt in dts {
                riser.tick(dt, RiseRate::new(rate));
                prop_assert!(riser.height() >= last);
                last = riser.height();
            }
        }
    }
}
