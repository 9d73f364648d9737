use rand::{seq::SliceRandom, Rng};

pub const MINUTES: u8 = 60;

/// Step two: a slider whose positions map onto a shuffled sequence, so the
/// displayed value jumps around as the knob moves.
#[derive(Debug, Clone)]
pub struct ShuffledSequencePicker {
    permutation: Vec<u8>,
    index: usize,
    confirmed: Option<u8>,
}

impl ShuffledSequencePicker {
    /// Builds a permutation of `0..len` with an unbiased Fisher-Yates shuffle.
    pub fn new<R: Rng + ?Sized>(len: u8, rng: &mut R) -> Self {
        let mut permutation: Vec<u8> = (0..len).collect();
        permutation.shuffle(rng);
        Self {
            permutation,
            index: 0,
            confirmed: None,
        }
    }

    pub fn minutes<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(MINUTES, rng)
    }

    pub fn permutation(&self) -> &[u8] {
        &self.permutation
    }

    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> u8 {
        self.permutation.get(self.index).copied().unwrap_or(0)
    }

    pub fn confirmed(&self) -> Option<u8> {
        self.confirmed
    }

    pub fn is_locked(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Moves the knob; clamped to the slider range. Ignored once locked.
    pub fn set_index(&mut self, index: usize) -> bool {
        if self.is_locked() || self.is_empty() {
            return false;
        }
        self.index = index.min(self.len() - 1);
        true
    }

    pub fn step(&mut self, delta: isize) -> bool {
        let target = self.index.saturating_add_signed(delta);
        self.set_index(target)
    }

    /// Locks the displayed value. The permutation is never regenerated.
    pub fn confirm(&mut self) -> Option<u8> {
        if self.is_locked() || self.is_empty() {
            return None;
        }
        let minute = self.current();
        self.confirmed = Some(minute);
        tracing::info!(minute, index = self.index, "minute locked");
        Some(minute)
    }
}
