//! Difficulty: how fast the lava climbs
//!
//! The base rate comes from a curve keyed on camera height. A catch-up term
//! is added while a lone survivor sits near the top of the screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::riser::RiseRate;
use crate::{damp, inverse_lerp, lerp};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("difficulty curve has no keys")]
    Empty,
    #[error("difficulty curve key {index} is not finite")]
    NotFinite { index: usize },
    #[error("difficulty curve heights must strictly increase (key {index})")]
    HeightOrder { index: usize },
    #[error("difficulty curve rates must not decrease (key {index})")]
    RateOrder { index: usize },
    #[error("difficulty curve rate at key {index} is negative")]
    NegativeRate { index: usize },
}

/// One authored point: at camera `height`, rise at `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub height: f32,
    pub rate: f32,
}

impl CurveKey {
    pub const fn new(height: f32, rate: f32) -> Self {
        Self { height, rate }
    }
}

/// Monotonic piecewise-linear curve, clamped at both ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct DifficultyCurve {
    keys: Vec<CurveKey>,
}

impl DifficultyCurve {
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, key) in keys.iter().enumerate() {
            if !key.height.is_finite() || !key.rate.is_finite() {
                return Err(CurveError::NotFinite { index });
            }
            if key.rate < 0.0 {
                return Err(CurveError::NegativeRate { index });
            }
            if index > 0 {
                let prev = keys[index - 1];
                if key.height <= prev.height {
                    return Err(CurveError::HeightOrder { index });
                }
                if key.rate < prev.rate {
                    return Err(CurveError::RateOrder { index });
                }
            }
        }
        Ok(Self { keys })
    }

    /// Flat curve with a single rate everywhere
    pub fn constant(rate: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, rate.max(0.0))],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn evaluate(&self, height: f32) -> f32 {
        let first = self.keys[0];
        if height <= first.height {
            return first.rate;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if height <= b.height {
                return lerp(a.rate, b.rate, inverse_lerp(a.height, b.height, height));
            }
        }
        // Above the last key
        self.keys[self.keys.len() - 1].rate
    }
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            keys: vec![
                CurveKey::new(0.0, 0.35),
                CurveKey::new(40.0, 0.6),
                CurveKey::new(120.0, 1.0),
                CurveKey::new(240.0, 1.4),
            ],
        }
    }
}

impl TryFrom<Vec<CurveKey>> for DifficultyCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<DifficultyCurve> for Vec<CurveKey> {
    fn from(curve: DifficultyCurve) -> Self {
        curve.keys
    }
}

/// Tuning for the lone-survivor boost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchUpTuning {
    /// Normalized screen height (0 bottom, 1 top) that arms the boost
    pub threshold: f32,
    /// Boost gained per second while armed
    pub pace: f32,
    /// Fraction of the boost left after one second of decay
    pub smoothing: f32,
    /// Vertical extent of the view centred on the camera anchor
    pub view_height: f32,
}

impl Default for CatchUpTuning {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            pace: 0.25,
            smoothing: 0.2,
            view_height: 16.0,
        }
    }
}

impl CatchUpTuning {
    /// Where `y` lands on a screen anchored at `camera_height` (unclamped)
    pub fn screen_height(&self, y: f32, camera_height: f32) -> f32 {
        let bottom = camera_height - self.view_height * 0.5;
        (y - bottom) / self.view_height.max(f32::EPSILON)
    }
}

/// Accumulator for the catch-up term
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatchUp {
    value: f32,
}

impl CatchUp {
    /// `lone_survivor_y` is only `Some` when exactly one player remains
    pub fn update(
        &mut self,
        tuning: &CatchUpTuning,
        lone_survivor_y: Option<f32>,
        camera_height: f32,
        dt: f32,
    ) -> f32 {
        let armed = lone_survivor_y
            .map(|y| tuning.screen_height(y, camera_height) > tuning.threshold)
            .unwrap_or(false);

        if armed {
            self.value += tuning.pace * dt.max(0.0);
        } else {
            self.value = damp(self.value, 0.0, tuning.smoothing, dt);
            if self.value < 1e-4 {
                self.value = 0.0;
            }
        }
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Produces the single authoritative rise rate for a tick
#[derive(Debug, Clone, Default)]
pub struct DifficultyEvaluator {
    pub curve: DifficultyCurve,
    pub catch_up_tuning: CatchUpTuning,
    catch_up: CatchUp,
    bias: f32,
}

impl DifficultyEvaluator {
    pub fn new(curve: DifficultyCurve, catch_up_tuning: CatchUpTuning) -> Self {
        Self {
            curve,
            catch_up_tuning,
            catch_up: CatchUp::default(),
            bias: 0.0,
        }
    }

    /// Base rate from the curve alone
    pub fn rate(&self, camera_height: f32) -> f32 {
        self.curve.evaluate(camera_height)
    }

    pub fn evaluate(
        &mut self,
        camera_height: f32,
        lone_survivor_y: Option<f32>,
        dt: f32,
    ) -> RiseRate {
        let tuning = &self.catch_up_tuning;
        let boost = self.catch_up.update(tuning, lone_survivor_y, camera_height, dt);
        RiseRate::new(self.rate(camera_height) + boost + self.bias)
    }

    /// Debug tweak of the rise rate at `camera_height`.
    ///
    /// The bias never drops below the negated curve rate there.
    pub fn nudge(&mut self, delta: f32, camera_height: f32) {
        self.bias = (self.bias + delta).max(-self.rate(camera_height));
        log::debug!("Rise rate bias now {:+.2}", self.bias);
    }

    pub fn catch_up(&self) -> f32 {
        self.catch_up.value()
    }

    /// Clears catch-up and debug bias (new match)
    pub fn reset(&mut self) {
        self.catch_up.reset();
        self.bias = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> DifficultyCurve {
        DifficultyCurve::new(vec![CurveKey::new(0.0, 1.0), CurveKey::new(10.0, 2.0)]).unwrap()
    }

    #[test]
    fn test_curve_interpolates_and_clamps() {
        let c = curve();
        assert_eq!(c.evaluate(-5.0), 1.0);
        assert!((c.evaluate(5.0) - 1.5).abs() < 1e-6);
        assert_eq!(c.evaluate(10.0), 2.0);
        // Past the last key we hold the last value
        assert_eq!(c.evaluate(500.0), 2.0);
    }

    #[test]
    fn test_curve_rejects_bad_keys() {
        assert_eq!(DifficultyCurve::new(vec![]), Err(CurveError::Empty));
        assert_eq!(
            DifficultyCurve::new(vec![CurveKey::new(5.0, 1.0), CurveKey::new(5.0, 2.0)]),
            Err(CurveError::HeightOrder { index: 1 })
        );
        assert_eq!(
            DifficultyCurve::new(vec![CurveKey::new(0.0, 2.0), CurveKey::new(5.0, 1.0)]),
            Err(CurveError::RateOrder { index: 1 })
        );
    }

    #[test]
    fn test_curve_deserializes_with_validation() {
        let ok: DifficultyCurve =
            serde_json::from_str(r#"[{"height":0,"rate":0.5},{"height":10,"rate":1}]"#).unwrap();
        assert_eq!(ok.keys().len(), 2);
        let bad = serde_json::from_str::<DifficultyCurve>(r#"[]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_catch_up_accumulates_for_lone_leader() {
        let tuning = CatchUpTuning::default();
        let mut catch_up = CatchUp::default();
        // Camera at 0, view 16 tall: y = 7 is near the top edge
        for _ in 0..60 {
            catch_up.update(&tuning, Some(7.0), 0.0, 1.0 / 60.0);
        }
        assert!((catch_up.value() - tuning.pace).abs() < 1e-3);
    }

    #[test]
    fn test_catch_up_inert_with_several_survivors() {
        let tuning = CatchUpTuning::default();
        let mut catch_up = CatchUp::default();
        catch_up.update(&tuning, Some(7.0), 0.0, 1.0);
        let armed = catch_up.value();
        assert!(armed > 0.0);

        // No lone survivor: the boost decays instead of growing
        for _ in 0..10 {
            catch_up.update(&tuning, None, 0.0, 1.0);
        }
        assert!(catch_up.value() < armed * 0.01);
    }

    #[test]
    fn test_evaluator_adds_bias_and_clamps() {
        let mut eval = DifficultyEvaluator::new(curve(), CatchUpTuning::default());
        assert_eq!(eval.evaluate(0.0, None, 0.1).get(), 1.0);
        eval.nudge(0.5, 0.0);
        assert_eq!(eval.evaluate(0.0, None, 0.1).get(), 1.5);
        eval.nudge(-10.0, 0.0);
        assert_eq!(eval.evaluate(0.0, None, 0.1), RiseRate::ZERO);
        eval.reset();
        assert_eq!(eval.evaluate(0.0, None, 0.1).get(), 1.0);
    }

    #[test]
    fn test_nudge_recovers_after_bottoming_out() {
        let mut eval = DifficultyEvaluator::new(curve(), CatchUpTuning::default());
        for _ in 0..30 {
            eval.nudge(-0.1, 0.0);
        }
        assert_eq!(eval.evaluate(0.0, None, 0.1), RiseRate::ZERO);

        // One press up is visible straight away
        eval.nudge(0.1, 0.0);
        assert!((eval.evaluate(0.0, None, 0.1).get() - 0.1).abs() < 1e-6);
    }
}
