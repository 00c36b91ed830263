//! Fault injection: reordering, loss, and corruption applied before sending.
//!
//! Every decision comes from an explicit model so that tests can pin the
//! outcome. [`ChaosFaults`] draws from a seeded ChaCha8 RNG: given the same
//! seed and the same segments, it shuffles and drops identically on every run.

use faultline_core::config::FaultConfig;
use faultline_core::Segment;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// What happens to one segment on its way to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Written unchanged.
    Deliver,
    /// Never written. The receiver gets no notice.
    Drop,
    /// Written with its payload replaced and its checksum left stale.
    Corrupt,
}

/// Decides delivery order and per-segment fate.
pub trait FaultModel {
    /// Put segments into the order they will be written.
    fn reorder(&mut self, segments: &mut [Segment]);

    /// Decide the fate of a single segment.
    fn decide(&mut self, segment: &Segment) -> Fault;
}

/// Uniform shuffle plus two independent Bernoulli trials per segment.
pub struct ChaosFaults {
    rng: ChaCha8Rng,
    seed: u64,
    loss_rate: f64,
    corrupt_rate: f64,
}

impl ChaosFaults {
    /// Rates are clamped into [0, 1]. NaN counts as 0.
    pub fn new(loss_rate: f64, corrupt_rate: f64, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            loss_rate: clamp_rate(loss_rate),
            corrupt_rate: clamp_rate(corrupt_rate),
        }
    }

    /// Shuffle only. Nothing is dropped or corrupted.
    pub fn lossless(seed: u64) -> Self {
        Self::new(0.0, 0.0, seed)
    }

    /// Build from config. Without a configured seed a random one is drawn;
    /// read it back with [`ChaosFaults::seed`] to replay the run.
    pub fn from_config(config: &FaultConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::new(config.loss_rate, config.corrupt_rate, seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn loss_rate(&self) -> f64 {
        self.loss_rate
    }

    pub fn corrupt_rate(&self) -> f64 {
        self.corrupt_rate
    }
}

fn clamp_rate(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

impl FaultModel for ChaosFaults {
    fn reorder(&mut self, segments: &mut [Segment]) {
        segments.shuffle(&mut self.rng);
    }

    fn decide(&mut self, _segment: &Segment) -> Fault {
        if self.rng.gen_bool(self.loss_rate) {
            Fault::Drop
        } else if self.rng.gen_bool(self.corrupt_rate) {
            Fault::Corrupt
        } else {
            Fault::Deliver
        }
    }
}

/// Keeps file order and delivers everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaults;

impl FaultModel for NoFaults {
    fn reorder(&mut self, _segments: &mut [Segment]) {}

    fn decide(&mut self, _segment: &Segment) -> Fault {
        Fault::Deliver
    }
}
