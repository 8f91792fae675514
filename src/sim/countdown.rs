//! Last-survivor countdown
//!
//! Started when a single player is left standing. Expiry hands that player
//! the win; it fires once per countdown.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CountdownPhase {
    Inactive,
    CountingDown { winner: u32, remaining: f32 },
    /// Expiry already reported; stays here until cancelled or restarted
    Expired { winner: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinCountdown {
    duration: f32,
    phase: CountdownPhase,
}

impl WinCountdown {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            phase: CountdownPhase::Inactive,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.phase, CountdownPhase::CountingDown { .. })
    }

    /// Provisional (or final) winner's player index
    pub fn winner(&self) -> Option<u32> {
        match self.phase {
            CountdownPhase::Inactive => None,
            CountdownPhase::CountingDown { winner, .. } | CountdownPhase::Expired { winner } => {
                Some(winner)
            }
        }
    }

    pub fn remaining(&self) -> Option<f32> {
        match self.phase {
            CountdownPhase::Inactive => None,
            CountdownPhase::CountingDown { remaining, .. } => Some(remaining),
            CountdownPhase::Expired { .. } => Some(0.0),
        }
    }

    /// Start from full duration with `winner` as the provisional victor
    pub fn begin(&mut self, winner: u32) {
        self.phase = CountdownPhase::CountingDown {
            winner,
            remaining: self.duration,
        };
    }

    /// A returning player earns everybody a fresh grace period
    pub fn restart(&mut self) {
        if let CountdownPhase::CountingDown { remaining, .. } = &mut self.phase {
            *remaining = self.duration;
        }
    }

    pub fn cancel(&mut self) {
        self.phase = CountdownPhase::Inactive;
    }

    /// Advance by unscaled `dt`. Time only elapses while `sole_survivor` holds.
    ///
    /// Returns the winner on the tick the timer runs out, and never again.
    pub fn tick(&mut self, dt: f32, sole_survivor: bool) -> Option<u32> {
        let CountdownPhase::CountingDown { winner, remaining } = &mut self.phase else {
            return None;
        };
        if !sole_survivor {
            return None;
        }

        *remaining = (*remaining - dt.max(0.0)).max(0.0);
        if *remaining <= 0.0 {
            let winner = *winner;
            self.phase = CountdownPhase::Expired { winner };
            return Some(winner);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_begin_records_winner() {
        let mut countdown = WinCountdown::new(10.0);
        assert_eq!(countdown.winner(), None);
        countdown.begin(2);
        assert!(countdown.is_counting());
        assert_eq!(countdown.winner(), Some(2));
        assert_eq!(countdown.remaining(), Some(10.0));
    }

    #[test]
    fn test_restart_resets_to_full_duration() {
        let mut countdown = WinCountdown::new(10.0);
        countdown.begin(0);
        countdown.tick(4.0, true);
        assert_eq!(countdown.remaining(), Some(6.0));

        countdown.restart();
        assert_eq!(countdown.remaining(), Some(10.0));
        assert_eq!(countdown.winner(), Some(0));
    }

    #[test]
    fn test_restart_ignored_when_inactive() {
        let mut countdown = WinCountdown::new(10.0);
        countdown.restart();
        assert_eq!(countdown.phase(), CountdownPhase::Inactive);
    }

    #[test]
    fn test_suspended_while_several_survive() {
        let mut countdown = WinCountdown::new(3.0);
        countdown.begin(1);
        assert_eq!(countdown.tick(5.0, false), None);
        assert_eq!(countdown.remaining(), Some(3.0));
    }

    #[test]
    fn test_expiry_fires_once() {
        let mut countdown = WinCountdown::new(1.0);
        countdown.begin(3);
        assert_eq!(countdown.tick(0.5, true), None);
        assert_eq!(countdown.tick(0.5, true), Some(3));
        assert_eq!(countdown.tick(0.5, true), None);
        assert_eq!(countdown.remaining(), Some(0.0));
        assert_eq!(countdown.winner(), Some(3));
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut countdown = WinCountdown::new(1.0);
        countdown.begin(3);
        countdown.cancel();
        assert_eq!(countdown.tick(5.0, true), None);
        assert_eq!(countdown.winner(), None);
    }

    proptest! {
        #[test]
        fn prop_expiry_is_edge_triggered(
            duration in 0.0f32..20.0,
            dts in proptest::collection::vec(0.0f32..1.0, 0..200),
        ) {
            let mut countdown = WinCountdown::new(duration);
            countdown.begin(0);
            let mut fired = 0;
            for dt in dts {
                if countdown.tick(dt, true).is_some() {
                    fired += 1;
                }
                prop_assert!(countdown.remaining().unwrap_or(0.0) >= 0.0);
            }
            prop_assert!(fired <= 1);
        }
    }
}
