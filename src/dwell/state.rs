use std::time::{Duration, Instant};

use serde::Serialize;

/// Dwell phase of a single identity.
///
/// `Counted` is absorbing: once reached it is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellPhase {
    /// Not close enough, clock stopped
    #[default]
    Far,
    /// Close enough, clock running
    Pending,
    /// Credited to the visitor total
    Counted,
}

/// Per-identity dwell bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct DwellState {
    /// Largest area ratio ever observed for this identity.
    pub max_area_ratio: f64,
    enter_time: Option<Instant>,
    counted: bool,
}

impl DwellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// Start of the current uninterrupted stretch of proximity.
    pub fn enter_time(&self) -> Option<Instant> {
        self.enter_time
    }

    /// Advance the state machine by one observation.
    ///
    /// Returns the phase after the observation and whether this call made
    /// the identity counted.
    pub fn observe(&mut self, near: bool, now: Instant, required: Duration) -> (DwellPhase, bool) {
        if !near {
            if !self.counted {
                self.enter_time = None;
                return (DwellPhase::Far, false);
            }
            return (DwellPhase::Counted, false);
        }

        let enter = *self.enter_time.get_or_insert(now);
        if self.counted {
            return (DwellPhase::Counted, false);
        }

        if now.saturating_duration_since(enter) >= required {
            self.counted = true;
            (DwellPhase::Counted, true)
        } else {
            (DwellPhase::Pending, false)
        }
    }

    /// Time left on the running clock, if any.
    pub fn remaining(&self, now: Instant, required: Duration) -> Option<Duration> {
        if self.counted {
            return None;
        }
        self.enter_time
            .map(|enter| required.saturating_sub(now.saturating_duration_since(enter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: Duration = Duration::from_secs(10);

    #[test]
    fn test_far_to_pending_to_counted() {
        let t0 = Instant::now();
        let mut state = DwellState::new();
        assert_eq!(state.observe(false, t0, REQUIRED), (DwellPhase::Far, false));
        assert_eq!(state.observe(true, t0, REQUIRED), (DwellPhase::Pending, false));
        assert_eq!(
            state.remaining(t0 + Duration::from_secs(4), REQUIRED),
            Some(Duration::from_secs(6))
        );
        assert_eq!(
            state.observe(true, t0 + Duration::from_secs(10), REQUIRED),
            (DwellPhase::Counted, true)
        );
        assert!(state.is_counted());
        assert_eq!(state.remaining(t0 + Duration::from_secs(11), REQUIRED), None);
    }

    #[test]
    fn test_dropout_resets_clock() {
        let t0 = Instant::now();
        let mut state = DwellState::new();
        state.observe(true, t0, REQUIRED);
        state.observe(false, t0 + Duration::from_secs(9), REQUIRED);
        assert_eq!(state.enter_time(), None);
        let (phase, _) = state.observe(true, t0 + Duration::from_secs(12), REQUIRED);
        assert_eq!(phase, DwellPhase::Pending);
        assert_eq!(state.enter_time(), Some(t0 + Duration::from_secs(12)));
    }

    #[test]
    fn test_counted_is_absorbing() {
        let t0 = Instant::now();
        let mut state = DwellState::new();
        state.observe(true, t0, Duration::ZERO);
        assert!(state.is_counted());
        for (i, near) in [false, true, false, true].into_iter().enumerate() {
            let now = t0 + Duration::from_secs(i as u64);
            let (phase, newly) = state.observe(near, now, REQUIRED);
            assert_eq!(phase, DwellPhase::Counted);
            assert!(!newly);
        }
    }
}
