use chrono::{Duration as TimeDelta, NaiveDateTime};
use std::fmt;
use std::time::Duration;

use crate::alarm::AlarmTime;
use crate::audio::{AudioPlayer, PlaybackOutcome};
use crate::schedule::{Interval, Moment};

pub const RECOMPUTE_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemainingTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl RemainingTime {
    pub fn from_total_seconds(total: i64) -> Self {
        let total = total.max(0) as u64;
        Self {
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds)
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Today's occurrence of the alarm if it is still strictly ahead, else tomorrow's.
pub fn next_occurrence(target: &AlarmTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(target.time_of_day());
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Whole seconds (floored) until the next occurrence of `target`.
pub fn remaining_until(target: &AlarmTime, now: NaiveDateTime) -> RemainingTime {
    let delta_ms = (next_occurrence(target, now) - now).num_milliseconds();
    RemainingTime::from_total_seconds(delta_ms.div_euclid(1000))
}

/// Step four: counts down to the alarm and rings it.
#[derive(Debug)]
pub struct CountdownClock {
    target: AlarmTime,
    remaining: RemainingTime,
    occurrence: NaiveDateTime,
    triggered: bool,
    sound_blocked: bool,
    player: Box<dyn AudioPlayer>,
    recompute: Interval,
}

impl CountdownClock {
    /// Computes the remaining time immediately, then once per second.
    pub fn new(target: AlarmTime, player: Box<dyn AudioPlayer>, at: Moment) -> Self {
        let mut clock = Self {
            target,
            remaining: RemainingTime::default(),
            occurrence: next_occurrence(&target, at.wall),
            triggered: false,
            sound_blocked: false,
            player,
            recompute: Interval::start(RECOMPUTE_PERIOD, at.instant),
        };
        clock.refresh(at.wall);
        clock
    }

    pub fn target(&self) -> &AlarmTime {
        &self.target
    }

    pub fn remaining(&self) -> RemainingTime {
        self.remaining
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    pub fn is_sound_blocked(&self) -> bool {
        self.sound_blocked
    }

    pub fn is_sound_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Returns true on the tick the alarm goes off.
    pub fn on_tick(&mut self, at: Moment) -> bool {
        if let Err(e) = self.player.tick(at.instant) {
            tracing::warn!(error = %e, "alarm sound tick failed");
        }
        if self.triggered && !self.sound_blocked && self.player.is_blocked() {
            tracing::info!(alarm = %self.target, "alarm sound rejected after start");
            self.sound_blocked = true;
        }
        if self.recompute.poll(at.instant) == 0 {
            return false;
        }
        self.refresh(at.wall)
    }

    /// Fires when the floored remaining time hits zero, or when the target
    /// occurrence rolled over to the next day since the last computation
    /// (a late tick skipped the final second).
    fn refresh(&mut self, wall: NaiveDateTime) -> bool {
        let occurrence = next_occurrence(&self.target, wall);
        let rolled_over = occurrence > self.occurrence;
        self.occurrence = occurrence;
        self.remaining = remaining_until(&self.target, wall);

        let due = self.remaining.total_seconds() <= 0 || rolled_over;
        if !due || self.triggered {
            return false;
        }

        self.triggered = true;
        tracing::info!(alarm = %self.target, "alarm triggered");
        self.start_sound();
        true
    }

    fn start_sound(&mut self) {
        match self.player.play() {
            Ok(PlaybackOutcome::Started) => self.sound_blocked = false,
            Ok(PlaybackOutcome::Blocked) => self.sound_blocked = true,
            Err(e) => {
                tracing::error!(error = %e, "alarm sound failed to start");
                self.sound_blocked = true;
            }
        }
    }

    /// The user's manual retry after a blocked start
    pub fn enable_sound(&mut self) -> bool {
        if !self.triggered || !self.sound_blocked {
            return false;
        }
        self.start_sound();
        !self.sound_blocked
    }

    /// Halts and rewinds the sound and clears the latch. The owner resets the flow.
    pub fn dismiss(&mut self) {
        if let Err(e) = self.player.pause() {
            tracing::warn!(error = %e, "alarm sound did not stop cleanly");
        }
        self.player.rewind();
        self.triggered = false;
        self.sound_blocked = false;
        self.recompute.cancel();
        tracing::info!(alarm = %self.target, "alarm dismissed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Meridiem;
    use crate::audio::{AudioError, SilentPlayer};
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Instant;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn alarm(hour: u8, minute: u8, meridiem: Meridiem) -> AlarmTime {
        AlarmTime::new(hour, minute, meridiem).unwrap()
    }

    #[test]
    fn midnight_alarm_does_not_roll_over_wrongly() {
        let r = remaining_until(&alarm(12, 0, Meridiem::Am), at(23, 59, 58));
        assert_eq!(
            r,
            RemainingTime {
                hours: 0,
                minutes: 0,
                seconds: 2
            }
        );
        assert_eq!(r.to_string(), "00:00:02");
    }

    #[test]
    fn passed_alarm_targets_tomorrow() {
        let now = at(20, 15, 0);
        let target = alarm(7, 30, Meridiem::Pm);
        let next = next_occurrence(&target, now);
        assert_eq!(next.date(), now.date().succ_opt().unwrap());

        let total = remaining_until(&target, now).total_seconds();
        assert!(total > 0 && total < 24 * 3600);
        assert_eq!(total, 23 * 3600 + 15 * 60);
    }

    #[test]
    fn upcoming_alarm_targets_today() {
        let r = remaining_until(&alarm(7, 30, Meridiem::Pm), at(18, 0, 0));
        assert_eq!((r.hours, r.minutes, r.seconds), (1, 30, 0));
    }

    #[test]
    fn exact_alarm_time_counts_a_full_day() {
        let r = remaining_until(&alarm(6, 0, Meridiem::Am), at(6, 0, 0));
        assert_eq!(r.total_seconds(), 24 * 3600);
    }

    #[test]
    fn sub_second_delta_floors_to_zero() {
        let now = at(6, 59, 59) + TimeDelta::milliseconds(400);
        let r = remaining_until(&alarm(7, 0, Meridiem::Am), now);
        assert_eq!(r.total_seconds(), 0);
    }

    #[derive(Debug, Default)]
    struct Tally {
        plays: Cell<u32>,
        pauses: Cell<u32>,
        rewinds: Cell<u32>,
    }

    /// Rejects the first `reject` play attempts, like an autoplay policy
    #[derive(Debug)]
    struct TallyPlayer {
        tally: Rc<Tally>,
        reject: u32,
        /// Starts, then dies on the next tick, like a player with no sound server
        dies_on_tick: bool,
        playing: bool,
        blocked: bool,
    }

    impl AudioPlayer for TallyPlayer {
        fn play(&mut self) -> Result<PlaybackOutcome, AudioError> {
            self.tally.plays.set(self.tally.plays.get() + 1);
            if self.tally.plays.get() <= self.reject {
                return Ok(PlaybackOutcome::Blocked);
            }
            self.playing = true;
            self.blocked = false;
            Ok(PlaybackOutcome::Started)
        }

        fn is_blocked(&self) -> bool {
            self.blocked
        }

        fn tick(&mut self, _now: Instant) -> Result<(), AudioError> {
            if self.dies_on_tick && self.playing {
                self.playing = false;
                self.blocked = true;
            }
            Ok(())
        }

        fn pause(&mut self) -> Result<(), AudioError> {
            self.tally.pauses.set(self.tally.pauses.get() + 1);
            self.playing = false;
            Ok(())
        }

        fn rewind(&mut self) {
            self.tally.rewinds.set(self.tally.rewinds.get() + 1);
        }

        fn is_playing(&self) -> bool {
            self.playing
        }
    }

    fn tally_player(reject: u32) -> (Rc<Tally>, Box<dyn AudioPlayer>) {
        build_tally(reject, false)
    }

    fn build_tally(reject: u32, dies_on_tick: bool) -> (Rc<Tally>, Box<dyn AudioPlayer>) {
        let tally = Rc::new(Tally::default());
        let player = TallyPlayer {
            tally: Rc::clone(&tally),
            reject,
            dies_on_tick,
            playing: false,
            blocked: false,
        };
        (tally, Box::new(player))
    }

    #[test]
    fn computes_immediately_on_mount() {
        let start = Moment::new(Instant::now(), at(7, 0, 0));
        let clock = CountdownClock::new(alarm(8, 0, Meridiem::Am), Box::new(SilentPlayer::default()), start);
        assert_eq!(clock.remaining().to_string(), "01:00:00");
        assert!(!clock.is_triggered());
    }

    #[test]
    fn recomputes_once_per_second() {
        let start = Moment::new(Instant::now(), at(7, 0, 0));
        let mut clock = CountdownClock::new(alarm(8, 0, Meridiem::Am), Box::new(SilentPlayer::default()), start);

        clock.on_tick(start.advanced(Duration::from_millis(500)));
        assert_eq!(clock.remaining().to_string(), "01:00:00");

        clock.on_tick(start.advanced(Duration::from_secs(1)));
        assert_eq!(clock.remaining().to_string(), "00:59:59");
    }

    #[test]
    fn triggers_once_and_stays_latched() {
        let (tally, player) = tally_player(0);
        let start = Moment::new(Instant::now(), at(6, 59, 57));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);

        let mut fired = 0;
        for s in 1..=6 {
            if clock.on_tick(start.advanced(Duration::from_secs(s))) {
                fired += 1;
            }
        }

        assert_eq!(fired, 1);
        assert!(clock.is_triggered());
        assert!(clock.is_sound_playing());
        assert_eq!(tally.plays.get(), 1);
    }

    #[test]
    fn late_tick_past_the_alarm_still_triggers() {
        let (_, player) = tally_player(0);
        let start = Moment::new(Instant::now(), at(6, 59, 58) + TimeDelta::milliseconds(900));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);
        assert!(!clock.is_triggered());

        // the next evaluation lands after 07:00:00, skipping the zero second
        assert!(clock.on_tick(start.advanced(Duration::from_millis(1200))));
        assert!(clock.is_triggered());
    }

    #[test]
    fn blocked_sound_recovers_through_manual_enable() {
        let (tally, player) = tally_player(1);
        let start = Moment::new(Instant::now(), at(6, 59, 59));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);

        assert!(clock.on_tick(start.advanced(Duration::from_secs(1))));
        assert!(clock.is_triggered());
        assert!(clock.is_sound_blocked());
        assert!(!clock.is_sound_playing());

        assert!(clock.enable_sound());
        assert!(!clock.is_sound_blocked());
        assert!(clock.is_sound_playing());
        assert_eq!(tally.plays.get(), 2);
        assert!(!clock.enable_sound());
    }

    #[test]
    fn player_dying_after_start_surfaces_as_blocked() {
        let (tally, player) = build_tally(0, true);
        let start = Moment::new(Instant::now(), at(6, 59, 59));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);

        assert!(clock.on_tick(start.advanced(Duration::from_secs(1))));
        assert!(!clock.is_sound_blocked());

        clock.on_tick(start.advanced(Duration::from_millis(1100)));
        assert!(clock.is_sound_blocked());
        assert!(!clock.is_sound_playing());

        assert!(clock.enable_sound());
        assert_eq!(tally.plays.get(), 2);
        assert!(!clock.is_sound_blocked());
    }

    #[test]
    fn dismiss_stops_rewinds_and_clears_latch() {
        let (tally, player) = tally_player(0);
        let start = Moment::new(Instant::now(), at(6, 59, 59));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);
        clock.on_tick(start.advanced(Duration::from_secs(1)));
        assert!(clock.is_triggered());

        clock.dismiss();

        assert!(!clock.is_triggered());
        assert!(!clock.is_sound_playing());
        assert_eq!(tally.pauses.get(), 1);
        assert_eq!(tally.rewinds.get(), 1);
        assert!(!clock.on_tick(start.advanced(Duration::from_secs(5))));
    }

    #[test]
    fn enable_sound_is_a_noop_before_trigger() {
        let (tally, player) = tally_player(0);
        let start = Moment::new(Instant::now(), at(1, 0, 0));
        let mut clock = CountdownClock::new(alarm(7, 0, Meridiem::Am), player, start);
        assert!(!clock.enable_sound());
        assert_eq!(tally.plays.get(), 0);
    }
}
