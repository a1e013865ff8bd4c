use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Every word a session can draw, in source order
pub const WORDS: [&str; 21] = [
    "queen",
    "hospital",
    "basketball",
    "cat",
    "change",
    "snail",
    "soup",
    "calendar",
    "sad",
    "desk",
    "guitar",
    "home",
    "railway",
    "zebra",
    "jelly",
    "car",
    "crow",
    "trade",
    "bag",
    "roll",
    "bubble",
];

/// Shuffled queue of words, consumed from the front.
///
/// The queue is never permanently empty: drawing from an exhausted queue
/// refills it with a fresh shuffle of [`WORDS`] first.
#[derive(Debug)]
pub struct WordQueue {
    words: VecDeque<&'static str>,
    rng: StdRng,
    refills: usize,
}

impl WordQueue {
    /// Build a shuffled queue. A seed makes the order reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut queue = Self {
            words: VecDeque::with_capacity(WORDS.len()),
            rng,
            refills: 0,
        };
        queue.reset();
        queue
    }

    fn reset(&mut self) {
        let mut words = WORDS.to_vec();
        words.shuffle(&mut self.rng);
        self.words = words.into();
    }

    /// Take the front word, reshuffling the full set first if nothing is left
    pub fn next_word(&mut self) -> &'static str {
        if self.words.is_empty() {
            self.reset();
            self.refills += 1;
            tracing::debug!(refills = self.refills, "word queue exhausted, reshuffled");
        }

        // reset() always leaves WORDS.len() entries behind
        self.words.pop_front().unwrap_or(WORDS[0])
    }

    pub fn remaining(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of times the queue ran dry and was reshuffled
    pub fn refills(&self) -> usize {
        self.refills
    }

    /// Words still queued, front first
    pub fn upcoming(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.words.iter().copied()
    }
}
