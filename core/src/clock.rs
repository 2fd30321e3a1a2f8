//! Simulation clock and the calendar epoch that anchors simulated seconds.

use crate::types::{RunId, SimTime};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

/// Tracks the decision time of the engine as it walks the order stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id: RunId,
    pub now:    SimTime,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self { run_id, now: 0.0 }
    }

    /// Move the clock to `t`. The clock never runs backwards; returns
    /// false when `t` is earlier than the current time.
    pub fn advance_to(&mut self, t: SimTime) -> bool {
        if t < self.now {
            return false;
        }
        self.now = t;
        true
    }
}

/// Calendar features of a simulated instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFeatures {
    pub hour:       u32,
    /// Monday = 0.
    pub weekday:    u32,
    pub is_weekend: bool,
    pub month:      u32,
}

/// Wall-clock instant that simulated time 0 maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEpoch(pub NaiveDateTime);

impl Default for SimEpoch {
    /// 2025-06-01 00:00:00
    fn default() -> Self {
        let midnight = NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self(midnight)
    }
}

impl SimEpoch {
    /// Calendar instant of simulated time `t`. None when `t` is not
    /// finite or falls outside the representable calendar range.
    pub fn datetime_at(&self, t: SimTime) -> Option<NaiveDateTime> {
        if !t.is_finite() {
            return None;
        }
        // Sub-millisecond precision has no effect on calendar features.
        // The cast saturates; out-of-range offsets fail below.
        let offset = TimeDelta::try_milliseconds((t * 1000.0).round() as i64)?;
        self.0.checked_add_signed(offset)
    }

    pub fn features_at(&self, t: SimTime) -> Option<TimeFeatures> {
        let dt = self.datetime_at(t)?;
        let weekday = dt.weekday().num_days_from_monday();
        Some(TimeFeatures {
            hour: dt.hour(),
            weekday,
            is_weekend: weekday >= 5,
            month: dt.month(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_epoch_starts_on_a_sunday_in_june() {
        let f = SimEpoch::default().features_at(0.0).unwrap();
        assert_eq!(f, TimeFeatures { hour: 0, weekday: 6, is_weekend: true, month: 6 });
    }

    #[test]
    fn features_roll_over_days_and_months() {
        let epoch = SimEpoch::default();
        // Monday 2025-06-02 09:30
        let f = epoch.features_at(86_400.0 + 9.5 * 3600.0).unwrap();
        assert_eq!(f.hour, 9);
        assert_eq!(f.weekday, 0);
        assert!(!f.is_weekend);

        // 30 days later is 2025-07-01
        assert_eq!(epoch.features_at(30.0 * 86_400.0).unwrap().month, 7);
    }

    #[test]
    fn unrepresentable_times_have_no_features() {
        let epoch = SimEpoch::default();
        assert!(epoch.features_at(-1e300).is_none());
        assert!(epoch.features_at(1e300).is_none());
        assert!(epoch.features_at(f64::NAN).is_none());
        assert!(epoch.features_at(f64::INFINITY).is_none());
        // Beyond chrono's calendar range but within i64 milliseconds.
        assert!(epoch.features_at(1e17).is_none());
    }

    #[test]
    fn clock_refuses_to_run_backwards() {
        let mut clock = SimClock::new("clock-test".into());
        assert!(clock.advance_to(60.0));
        assert!(clock.advance_to(60.0));
        assert!(!clock.advance_to(30.0));
        assert_eq!(clock.now, 60.0);
    }
}
