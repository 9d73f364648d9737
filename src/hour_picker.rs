use itertools::Itertools;
use rand::Rng;
use std::time::{Duration, Instant};

use crate::layout::{Position, RandomLayoutGenerator};
use crate::schedule::Interval;

pub const HOURS: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
pub const DEFAULT_SHUFFLE_INTERVAL: Duration = Duration::from_millis(2000);

/// Step one: twelve hour buttons that keep running away until one is locked.
#[derive(Debug)]
pub struct HourPicker {
    generator: RandomLayoutGenerator,
    positions: Vec<Position>,
    selected: Option<u8>,
    confirmed: Option<u8>,
    shuffle: Interval,
}

impl HourPicker {
    pub fn new<R: Rng + ?Sized>(
        generator: RandomLayoutGenerator,
        shuffle_period: Duration,
        rng: &mut R,
        now: Instant,
    ) -> Self {
        let positions = generator.generate(&HOURS, rng);
        Self {
            generator,
            positions,
            selected: None,
            confirmed: None,
            shuffle: Interval::start(shuffle_period, now),
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn generator(&self) -> &RandomLayoutGenerator {
        &self.generator
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    pub fn confirmed(&self) -> Option<u8> {
        self.confirmed
    }

    pub fn is_locked(&self) -> bool {
        self.confirmed.is_some()
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffle.is_active()
    }

    /// How far along the current shuffle period is, for the shrinking bar
    pub fn shuffle_progress(&self, now: Instant) -> f64 {
        self.shuffle.progress(now)
    }

    /// Returns true when the buttons moved
    pub fn on_tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) -> bool {
        if self.is_locked() || self.shuffle.poll(now) == 0 {
            return false;
        }

        self.positions = self.generator.generate(&HOURS, rng);
        self.selected = None;
        true
    }

    pub fn select(&mut self, label: u8) -> bool {
        if self.is_locked() || !self.positions.iter().any(|p| p.label == label) {
            return false;
        }
        self.selected = Some(label);
        true
    }

    /// Move the selection forward in reading order of the current layout
    pub fn select_next(&mut self) -> Option<u8> {
        self.cycle(1)
    }

    pub fn select_prev(&mut self) -> Option<u8> {
        self.cycle(-1)
    }

    fn cycle(&mut self, delta: isize) -> Option<u8> {
        if self.is_locked() || self.positions.is_empty() {
            return self.selected;
        }

        let order = self.reading_order();
        let len = order.len() as isize;
        let next = match self.selected.and_then(|s| order.iter().position(|&l| l == s)) {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None if delta >= 0 => 0,
            None => order.len() - 1,
        };

        self.selected = Some(order[next]);
        self.selected
    }

    /// Labels sorted top-to-bottom, then left-to-right
    pub fn reading_order(&self) -> Vec<u8> {
        self.positions
            .iter()
            .sorted_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
            .map(|p| p.label)
            .collect()
    }

    /// Locks the current selection. The layout freezes and shuffling stops.
    pub fn confirm(&mut self) -> Option<u8> {
        if self.is_locked() {
            return None;
        }
        let hour = self.selected?;
        self.confirmed = Some(hour);
        self.shuffle.cancel();
        tracing::info!(hour, "hour locked");
        Some(hour)
    }
}
