//! Random timestamp emitter over a bounded, stepped range.

use crate::emitter::{new_rng, Emitter, Seedable};
use crate::error::{Error, Result};
use crate::value::Record;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;

/// Emits timestamps drawn uniformly from a stepped range.
///
/// Candidate values are `start + k * step` for every `k` that stays at
/// or before `end`, so a one-second step over a day yields 86,401
/// candidates. `start` itself is always a candidate.
pub struct TimestampRange {
    start: DateTime<Utc>,
    step_secs: i64,
    steps: u64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl TimestampRange {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step_secs: i64,
        rng_seed: Option<u64>,
    ) -> Result<Self> {
        if start > end || step_secs <= 0 {
            return Err(Error::InvalidTimestampRange);
        }
        let span_secs = (end - start).num_seconds();
        let steps = (span_secs / step_secs) as u64 + 1;
        Ok(Self {
            start,
            step_secs,
            steps,
            rng: new_rng(rng_seed),
            rng_seed,
        })
    }

    fn sample(&mut self) -> DateTime<Utc> {
        let k = self.rng.random_range(0..self.steps) as i64;
        self.start + Duration::seconds(k * self.step_secs)
    }
}

impl Seedable for TimestampRange {
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.rng = new_rng(seed);
    }

    fn reset(&mut self) {
        self.rng = new_rng(self.rng_seed);
    }
}

impl Emitter for TimestampRange {
    type Output = DateTime<Utc>;

    fn emit_one(&mut self, _ctx: &Record) -> Result<DateTime<Utc>> {
        Ok(self.sample())
    }

    fn emit_many(&mut self, _ctx: &Record, count: usize) -> Result<Vec<DateTime<Utc>>> {
        Ok((0..count).map(|_| self.sample()).collect())
    }

    fn num_unique_values(&self) -> Option<u64> {
        Some(self.steps)
    }
}
