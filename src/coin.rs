use rand::Rng;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use crate::alarm::Meridiem;
use crate::schedule::Interval;

pub const FLIP_TICK: Duration = Duration::from_millis(100);
/// Half-turns per toss, drawn uniformly
pub const FLIP_STEPS: RangeInclusive<u32> = 8..=11;
const HALF_TURN: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinState {
    Idle,
    Flipping,
    Settled,
}

/// Step three: AM or PM is left to a coin toss.
#[derive(Debug, Clone)]
pub struct CoinFlipChooser {
    state: CoinState,
    rotation: u32,
    result: Option<Meridiem>,
    pending: Option<Meridiem>,
    steps_taken: u32,
    total_steps: u32,
    animation: Interval,
}

impl Default for CoinFlipChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinFlipChooser {
    pub fn new() -> Self {
        Self {
            state: CoinState::Idle,
            rotation: 0,
            result: None,
            pending: None,
            steps_taken: 0,
            total_steps: 0,
            animation: Interval::cancelled(FLIP_TICK),
        }
    }

    pub fn state(&self) -> CoinState {
        self.state
    }

    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    pub fn result(&self) -> Option<Meridiem> {
        self.result
    }

    pub fn is_flipping(&self) -> bool {
        self.state == CoinState::Flipping
    }

    /// The face currently pointing at the viewer
    pub fn showing(&self) -> Meridiem {
        if (self.rotation / HALF_TURN) % 2 == 0 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }

    /// Starts a toss. Ignored while a toss is already in the air.
    pub fn toss<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) -> bool {
        if self.is_flipping() {
            return false;
        }

        let outcome = if rng.gen_bool(0.5) {
            Meridiem::Am
        } else {
            Meridiem::Pm
        };
        self.result = None;
        self.pending = Some(outcome);
        self.steps_taken = 0;
        self.total_steps = rng.gen_range(FLIP_STEPS);
        self.animation.restart(now);
        self.state = CoinState::Flipping;
        tracing::debug!(steps = self.total_steps, "coin tossed");
        true
    }

    /// Advances the animation. Returns true on the tick the coin lands.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if !self.is_flipping() {
            return false;
        }

        for _ in 0..self.animation.poll(now) {
            self.steps_taken += 1;
            self.rotation += HALF_TURN;

            if self.steps_taken >= self.total_steps {
                self.settle();
                return true;
            }
        }
        false
    }

    fn settle(&mut self) {
        self.animation.cancel();
        self.result = self.pending.take();
        self.rotation = self.result.map_or(0, Meridiem::coin_angle);
        self.state = CoinState::Settled;
        tracing::info!(result = ?self.result, "coin settled");
    }

    /// Only a settled coin can be confirmed
    pub fn confirm(&self) -> Option<Meridiem> {
        match self.state {
            CoinState::Settled => self.result,
            _ => None,
        }
    }
}
