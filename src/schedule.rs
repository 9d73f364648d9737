use chrono::{Local, NaiveDateTime};
use std::time::{Duration, Instant};

/// A point in time as seen by both the monotonic timers and the wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moment {
    pub instant: Instant,
    pub wall: NaiveDateTime,
}

impl Moment {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Local::now().naive_local(),
        }
    }

    pub fn new(instant: Instant, wall: NaiveDateTime) -> Self {
        Self { instant, wall }
    }

    /// Both clocks moved forward by the same amount
    pub fn advanced(&self, by: Duration) -> Self {
        let wall_delta = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            instant: self.instant + by,
            wall: self.wall + wall_delta,
        }
    }
}

/// Periodic task owned by the widget that schedules it.
///
/// Nothing runs in the background: the owner polls the interval with the
/// current instant and acts on the number of periods that elapsed. Cancelling
/// (or dropping the owner) guarantees no further firings.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(Self::MIN_PERIOD);
        Self {
            period,
            next_due: Some(now + period),
        }
    }

    pub fn cancelled(period: Duration) -> Self {
        Self {
            period: period.max(Self::MIN_PERIOD),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn restart(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Returns how many periods elapsed since the previous poll.
    ///
    /// Missed periods are reported rather than dropped so animations can
    /// catch up step by step in scheduling order.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut fired = 0;
        while now >= due {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }

    /// Fraction of the current period already elapsed, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        match self.next_due {
            Some(due) => {
                let left = due.saturating_duration_since(now).as_secs_f64();
                (1.0 - left / self.period.as_secs_f64()).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_fires_once_per_period() {
        let t0 = Instant::now();
        let mut interval = Interval::start(Duration::from_millis(100), t0);

        assert_eq!(interval.poll(t0 + Duration::from_millis(50)), 0);
        assert_eq!(interval.poll(t0 + Duration::from_millis(100)), 1);
        assert_eq!(interval.poll(t0 + Duration::from_millis(150)), 0);
        assert_eq!(interval.poll(t0 + Duration::from_millis(200)), 1);
    }

    #[test]
    fn poll_reports_missed_periods() {
        let t0 = Instant::now();
        let mut interval = Interval::start(Duration::from_millis(100), t0);

        assert_eq!(interval.poll(t0 + Duration::from_millis(350)), 3);
        assert_eq!(interval.poll(t0 + Duration::from_millis(400)), 1);
    }

    #[test]
    fn cancelled_interval_never_fires() {
        let t0 = Instant::now();
        let mut interval = Interval::start(Duration::from_millis(10), t0);
        interval.cancel();

        assert!(!interval.is_active());
        assert_eq!(interval.poll(t0 + Duration::from_secs(5)), 0);
        assert_eq!(interval.progress(t0 + Duration::from_secs(5)), 0.0);
    }

    #[test]
    fn restart_reschedules_from_now() {
        let t0 = Instant::now();
        let mut interval = Interval::cancelled(Duration::from_millis(100));
        interval.restart(t0);

        assert!(interval.is_active());
        assert_eq!(interval.poll(t0 + Duration::from_millis(99)), 0);
        assert_eq!(interval.poll(t0 + Duration::from_millis(100)), 1);
    }

    #[test]
    fn zero_period_is_bumped() {
        let t0 = Instant::now();
        let mut interval = Interval::start(Duration::ZERO, t0);
        assert_eq!(interval.period(), Duration::from_millis(1));
        assert_eq!(interval.poll(t0 + Duration::from_millis(3)), 3);
    }

    #[test]
    fn progress_tracks_current_period() {
        let t0 = Instant::now();
        let interval = Interval::start(Duration::from_millis(200), t0);

        assert_eq!(interval.progress(t0), 0.0);
        assert!((interval.progress(t0 + Duration::from_millis(100)) - 0.5).abs() < 1e-9);
        assert_eq!(interval.progress(t0 + Duration::from_millis(300)), 1.0);
    }

    #[test]
    fn moment_advances_both_clocks() {
        let wall = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let m = Moment::new(Instant::now(), wall);
        let later = m.advanced(Duration::from_secs(2));

        assert_eq!(later.instant - m.instant, Duration::from_secs(2));
        assert_eq!(
            later.wall,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 1)
                .unwrap()
        );
    }
}
