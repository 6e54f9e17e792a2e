//! Weighted random selection, with and without replacement.
//!
//! [`Choice`] is the selection unit behind most randomness in the
//! crate: gates, repeat counts, categorical fields, and vocabularies
//! all reduce to picking from a weighted item set. Three regimes are
//! supported, selected by the `replace` / `replace_only_after_call`
//! pair:
//!
//! | replace | replace_only_after_call | semantics |
//! |---------|-------------------------|-----------|
//! | true    | false                   | independent weighted draws; duplicates anywhere |
//! | true    | true                    | each batch is internally duplicate-free; pool resets between calls |
//! | false   | false                   | a persistent weighted permutation is consumed across calls |

use crate::emitter::{new_rng, Emitter, Seedable};
use crate::error::{Error, Result};
use crate::math::{clamp, gaussian, poisson, weighted_shuffle};
use crate::value::Record;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

/// Options for constructing a [`Choice`] emitter.
///
/// `weights` and `cum_weights` are mutually exclusive; supplying
/// neither selects uniformly. `replace_only_after_call = true` implies
/// `replace = true`.
#[derive(Debug, Clone)]
pub struct ChoiceConfig {
    /// Per-item weights, one per item, non-cumulative
    pub weights: Option<Vec<f64>>,
    /// Cumulative weights, one per item, non-decreasing
    pub cum_weights: Option<Vec<f64>>,
    /// False if selecting an item prevents it from being selected again
    pub replace: bool,
    /// True if items are only replaced between calls, so each batch is
    /// internally duplicate-free
    pub replace_only_after_call: bool,
    /// Optional RNG seed; `None` uses OS entropy
    pub rng_seed: Option<u64>,
}

impl ChoiceConfig {
    /// Config with replacement and uniform weights, the default draw
    /// mode.
    pub fn new() -> Self {
        Self {
            weights: None,
            cum_weights: None,
            replace: true,
            replace_only_after_call: false,
            rng_seed: None,
        }
    }
}

impl Default for ChoiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Emitter that makes random selections from a fixed item set,
/// optionally weighted, with or without replacement.
pub struct Choice<T> {
    items: Vec<T>,
    weights: Option<Vec<f64>>,
    cum_weights: Option<Vec<f64>>,
    replace: bool,
    replace_only_after_call: bool,
    rng: StdRng,
    rng_seed: Option<u64>,
    /// Weighted permutation of item positions, maintained only while
    /// `replace` is false
    shuffled: Vec<usize>,
    shuffled_pos: usize,
}

fn validate_weights(num_items: usize, weights: &[f64]) -> Result<()> {
    if weights.len() != num_items {
        return Err(Error::WeightCountMismatch {
            items: num_items,
            weights: weights.len(),
        });
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidWeights);
    }
    if weights.iter().all(|w| *w == 0.0) {
        return Err(Error::InvalidWeights);
    }
    Ok(())
}

fn validate_cum_weights(num_items: usize, cum_weights: &[f64]) -> Result<()> {
    if cum_weights.len() != num_items {
        return Err(Error::WeightCountMismatch {
            items: num_items,
            weights: cum_weights.len(),
        });
    }
    if cum_weights.iter().any(|c| !c.is_finite() || *c < 0.0) {
        return Err(Error::InvalidCumWeights);
    }
    if cum_weights.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(Error::InvalidCumWeights);
    }
    if cum_weights[num_items - 1] <= 0.0 {
        return Err(Error::InvalidCumWeights);
    }
    Ok(())
}

fn cumulative(weights: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    weights
        .iter()
        .map(|w| {
            total += w;
            total
        })
        .collect()
}

fn decumulate(cum_weights: &[f64]) -> Vec<f64> {
    let mut previous = 0.0;
    cum_weights
        .iter()
        .map(|&c| {
            let w = c - previous;
            previous = c;
            w
        })
        .collect()
}

impl<T: Clone + PartialEq> Choice<T> {
    /// Build a choice emitter from items and a full config.
    ///
    /// Fails on an empty item set, on conflicting or malformed weight
    /// vectors, exactly at construction time.
    pub fn with_config(items: Vec<T>, config: ChoiceConfig) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyItems);
        }
        let (weights, cum_weights) = match (config.weights, config.cum_weights) {
            (Some(_), Some(_)) => return Err(Error::ConflictingWeights),
            (Some(w), None) => {
                validate_weights(items.len(), &w)?;
                let cum = cumulative(&w);
                (Some(w), Some(cum))
            }
            (None, Some(cum)) => {
                validate_cum_weights(items.len(), &cum)?;
                let w = decumulate(&cum);
                (Some(w), Some(cum))
            }
            (None, None) => (None, None),
        };
        let replace = config.replace || config.replace_only_after_call;
        let mut choice = Self {
            items,
            weights,
            cum_weights,
            replace,
            replace_only_after_call: config.replace_only_after_call,
            rng: new_rng(config.rng_seed),
            rng_seed: config.rng_seed,
            shuffled: Vec::new(),
            shuffled_pos: 0,
        };
        if !choice.replace {
            choice.regenerate_shuffle();
        }
        Ok(choice)
    }

    /// Uniform selection with replacement.
    pub fn uniform(items: Vec<T>) -> Result<Self> {
        Self::with_config(items, ChoiceConfig::new())
    }

    /// Weighted selection with replacement.
    pub fn weighted(items: Vec<T>, weights: Vec<f64>) -> Result<Self> {
        Self::with_config(
            items,
            ChoiceConfig {
                weights: Some(weights),
                ..ChoiceConfig::new()
            },
        )
    }

    /// The item set being selected from.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current per-item weights, if any.
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Current cumulative weights, if any.
    pub fn cum_weights(&self) -> Option<&[f64]> {
        self.cum_weights.as_deref()
    }

    pub fn replace(&self) -> bool {
        self.replace
    }

    pub fn replace_only_after_call(&self) -> bool {
        self.replace_only_after_call
    }

    /// Replace the per-item weights (`None` restores uniform
    /// selection). Recomputes the cumulative weights and, without
    /// replacement, regenerates the global shuffle from the new
    /// weights, discarding its progress.
    pub fn set_weights(&mut self, weights: Option<Vec<f64>>) -> Result<()> {
        match weights {
            Some(w) => {
                validate_weights(self.items.len(), &w)?;
                self.cum_weights = Some(cumulative(&w));
                self.weights = Some(w);
            }
            None => {
                self.weights = None;
                self.cum_weights = None;
            }
        }
        if !self.replace {
            self.regenerate_shuffle();
        }
        Ok(())
    }

    /// Replace the cumulative weights (`None` restores uniform
    /// selection). The per-item weights are recomputed to match.
    pub fn set_cum_weights(&mut self, cum_weights: Option<Vec<f64>>) -> Result<()> {
        match cum_weights {
            Some(cum) => {
                validate_cum_weights(self.items.len(), &cum)?;
                self.weights = Some(decumulate(&cum));
                self.cum_weights = Some(cum);
            }
            None => {
                self.weights = None;
                self.cum_weights = None;
            }
        }
        if !self.replace {
            self.regenerate_shuffle();
        }
        Ok(())
    }

    /// Switch between with- and without-replacement selection.
    ///
    /// Turning replacement off forces `replace_only_after_call` to
    /// false and establishes a fresh global shuffle.
    pub fn set_replace(&mut self, replace: bool) {
        self.replace = replace;
        if replace {
            self.shuffled.clear();
            self.shuffled_pos = 0;
        } else {
            self.replace_only_after_call = false;
            self.regenerate_shuffle();
        }
    }

    /// Switch per-call batch uniqueness. Turning it on forces
    /// `replace` to true.
    pub fn set_replace_only_after_call(&mut self, replace_only_after_call: bool) {
        self.replace_only_after_call = replace_only_after_call;
        if replace_only_after_call && !self.replace {
            self.replace = true;
            self.shuffled.clear();
            self.shuffled_pos = 0;
        }
    }

    /// Establish a fresh weighted permutation of all item positions.
    fn regenerate_shuffle(&mut self) {
        let order = match &self.weights {
            Some(w) => weighted_shuffle(w, &mut self.rng, self.items.len()),
            None => {
                let uniform = vec![1.0; self.items.len()];
                weighted_shuffle(&uniform, &mut self.rng, self.items.len())
            }
        };
        debug!(items = self.items.len(), "regenerated global shuffle");
        self.shuffled = order;
        self.shuffled_pos = 0;
    }

    /// Item positions not yet consumed from the current permutation.
    fn remaining(&self) -> usize {
        self.shuffled.len() - self.shuffled_pos
    }

    /// One independent weighted draw (with replacement).
    fn sample_position(&mut self) -> usize {
        let Self {
            items,
            cum_weights,
            rng,
            ..
        } = self;
        match cum_weights {
            Some(cum) => {
                let total = cum[cum.len() - 1];
                let u = rng.random::<f64>() * total;
                cum.partition_point(|&c| c <= u).min(items.len() - 1)
            }
            None => rng.random_range(0..items.len()),
        }
    }

    fn draw_with_replacement(&mut self, count: usize) -> Vec<T> {
        if self.items.len() == 1 {
            return vec![self.items[0].clone(); count];
        }
        (0..count)
            .map(|_| {
                let pos = self.sample_position();
                self.items[pos].clone()
            })
            .collect()
    }

    /// Consume the next `count` entries of the global shuffle. A fresh
    /// permutation is established once the current one is exhausted;
    /// a batch larger than the remainder fails rather than straddling
    /// two permutations with in-batch duplicates.
    fn draw_without_replacement(&mut self, count: usize) -> Result<Vec<T>> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(Error::UniquenessViolation {
                requested: count,
                available: remaining,
            });
        }
        let start = self.shuffled_pos;
        let taken: Vec<T> = self.shuffled[start..start + count]
            .iter()
            .map(|&pos| self.items[pos].clone())
            .collect();
        self.shuffled_pos += count;
        if self.shuffled_pos == self.shuffled.len() {
            self.regenerate_shuffle();
        }
        Ok(taken)
    }

    /// One-off weighted sample without replacement, used for
    /// `replace_only_after_call` batches. The pool fully resets
    /// between calls.
    fn sample_batch(&mut self, count: usize) -> Result<Vec<T>> {
        if count > self.items.len() {
            return Err(Error::UniquenessViolation {
                requested: count,
                available: self.items.len(),
            });
        }
        let order = match &self.weights {
            Some(w) => weighted_shuffle(w, &mut self.rng, count),
            None => {
                let uniform = vec![1.0; self.items.len()];
                weighted_shuffle(&uniform, &mut self.rng, count)
            }
        };
        Ok(order.into_iter().map(|pos| self.items[pos].clone()).collect())
    }

    fn distinct_count<'a>(values: impl Iterator<Item = &'a T>) -> u64
    where
        T: 'a,
    {
        let mut seen: Vec<&T> = Vec::new();
        for value in values {
            if !seen.iter().any(|s| *s == value) {
                seen.push(value);
            }
        }
        seen.len() as u64
    }
}

impl<T: Clone + PartialEq> Seedable for Choice<T> {
    /// Reseeding an emitter without replacement regenerates the global
    /// shuffle, losing track of what has already been emitted.
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.rng = new_rng(seed);
        if !self.replace {
            self.regenerate_shuffle();
        }
    }

    fn reset(&mut self) {
        self.rng = new_rng(self.rng_seed);
        if !self.replace {
            self.regenerate_shuffle();
        }
    }
}

impl<T: Clone + PartialEq> Emitter for Choice<T> {
    type Output = T;

    fn emit_one(&mut self, _ctx: &Record) -> Result<T> {
        if !self.replace {
            let mut taken = self.draw_without_replacement(1)?;
            Ok(taken.remove(0))
        } else {
            let pos = self.sample_position();
            Ok(self.items[pos].clone())
        }
    }

    fn emit_many(&mut self, _ctx: &Record, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if !self.replace {
            return self.draw_without_replacement(count);
        }
        if self.replace_only_after_call && count > 1 {
            return self.sample_batch(count);
        }
        Ok(self.draw_with_replacement(count))
    }

    /// True only when the draw mode rules out in-batch repeats AND the
    /// relevant pool holds no duplicate values; positionally unique
    /// draws of duplicated values still repeat.
    fn emits_unique_values(&self) -> bool {
        if !self.replace {
            let remaining = self.remaining() as u64;
            self.num_unique_values() == Some(remaining)
        } else if self.replace_only_after_call {
            self.num_unique_values() == Some(self.items.len() as u64)
        } else {
            false
        }
    }

    fn num_unique_values(&self) -> Option<u64> {
        if !self.replace {
            let remaining = self.shuffled[self.shuffled_pos..]
                .iter()
                .map(|&pos| &self.items[pos]);
            Some(Self::distinct_count(remaining))
        } else {
            Some(Self::distinct_count(self.items.iter()))
        }
    }
}

/// A choice emitter whose weights follow a Poisson distribution over
/// item positions, peaking at position `mu` (1-based).
///
/// `weight_floor` sets the lowest possible individual weight, which
/// keeps the long tail visible for large item sets.
pub fn poisson_choice<T: Clone + PartialEq>(
    items: Vec<T>,
    mu: f64,
    weight_floor: f64,
    rng_seed: Option<u64>,
) -> Result<Choice<T>> {
    let weights: Vec<f64> = (1..=items.len())
        .map(|x| clamp(poisson(x as u32, mu), Some(weight_floor), None))
        .collect();
    Choice::with_config(
        items,
        ChoiceConfig {
            weights: Some(weights),
            rng_seed,
            ..ChoiceConfig::new()
        },
    )
}

/// A choice emitter whose weights follow a Gaussian distribution over
/// item positions, peaking at position `mu` with width `sigma`.
pub fn gaussian_choice<T: Clone + PartialEq>(
    items: Vec<T>,
    mu: f64,
    sigma: f64,
    weight_floor: f64,
    rng_seed: Option<u64>,
) -> Result<Choice<T>> {
    let weights: Vec<f64> = (1..=items.len())
        .map(|x| clamp(gaussian(x as f64, mu, sigma), Some(weight_floor), None))
        .collect();
    Choice::with_config(
        items,
        ChoiceConfig {
            weights: Some(weights),
            rng_seed,
            ..ChoiceConfig::new()
        },
    )
}

/// A boolean emitter with the given chance of emitting `true`.
///
/// Always emits `false` when `chance <= 0.0` and `true` when
/// `chance >= 1.0`. Commonly used as a field gate.
pub fn chance(chance: f64, rng_seed: Option<u64>) -> Result<Choice<bool>> {
    let p = clamp(chance, Some(0.0), Some(1.0));
    Choice::with_config(
        vec![true, false],
        ChoiceConfig {
            weights: Some(vec![p, 1.0 - p]),
            rng_seed,
            ..ChoiceConfig::new()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(rng_seed: u64) -> ChoiceConfig {
        ChoiceConfig {
            rng_seed: Some(rng_seed),
            ..ChoiceConfig::new()
        }
    }

    #[test]
    fn test_empty_items_fails() {
        let result = Choice::<i64>::uniform(vec![]);
        assert!(matches!(result, Err(Error::EmptyItems)));
    }

    #[test]
    fn test_conflicting_weight_vectors_fail() {
        let config = ChoiceConfig {
            weights: Some(vec![1.0, 2.0]),
            cum_weights: Some(vec![1.0, 3.0]),
            ..ChoiceConfig::new()
        };
        let result = Choice::with_config(vec!['a', 'b'], config);
        assert!(matches!(result, Err(Error::ConflictingWeights)));
    }

    #[test]
    fn test_weight_length_mismatch_fails() {
        let result = Choice::weighted(vec!['a', 'b', 'c'], vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(Error::WeightCountMismatch {
                items: 3,
                weights: 2
            })
        ));
    }

    #[test]
    fn test_negative_and_all_zero_weights_fail() {
        assert!(matches!(
            Choice::weighted(vec!['a', 'b'], vec![1.0, -0.5]),
            Err(Error::InvalidWeights)
        ));
        assert!(matches!(
            Choice::weighted(vec!['a', 'b'], vec![0.0, 0.0]),
            Err(Error::InvalidWeights)
        ));
    }

    #[test]
    fn test_decreasing_cum_weights_fail() {
        let config = ChoiceConfig {
            cum_weights: Some(vec![2.0, 1.0]),
            ..ChoiceConfig::new()
        };
        assert!(matches!(
            Choice::with_config(vec!['a', 'b'], config),
            Err(Error::InvalidCumWeights)
        ));
    }

    #[test]
    fn test_cum_weights_derive_plain_weights() {
        let config = ChoiceConfig {
            cum_weights: Some(vec![10.0, 30.0, 60.0]),
            ..ChoiceConfig::new()
        };
        let choice = Choice::with_config(vec!['a', 'b', 'c'], config).unwrap();
        assert_eq!(choice.weights(), Some(&[10.0, 20.0, 30.0][..]));
    }

    #[test]
    fn test_uniform_draws_stay_in_items() {
        let ctx = Record::new();
        let items = vec!['a', 'b', 'c'];
        let mut choice = Choice::with_config(items.clone(), seeded(42)).unwrap();

        for _ in 0..50 {
            let v = choice.emit_one(&ctx).unwrap();
            assert!(items.contains(&v));
        }
    }

    #[test]
    fn test_zero_weight_item_never_chosen() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec!['a', 'b', 'c'],
            ChoiceConfig {
                weights: Some(vec![1.0, 0.0, 1.0]),
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        for v in choice.emit_many(&ctx, 500).unwrap() {
            assert_ne!(v, 'b');
        }
    }

    #[test]
    fn test_without_replacement_full_permutation() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3, 4, 5],
            ChoiceConfig {
                weights: Some(vec![5.0, 4.0, 3.0, 2.0, 1.0]),
                replace: false,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        let mut batch = choice.emit_many(&ctx, 5).unwrap();
        batch.sort_unstable();
        assert_eq!(batch, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_without_replacement_continues_across_calls() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3, 4],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        let mut seen = choice.emit_many(&ctx, 2).unwrap();
        seen.extend(choice.emit_many(&ctx, 2).unwrap());
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_without_replacement_regenerates_after_exhaustion() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        choice.emit_many(&ctx, 3).unwrap();
        // A fresh permutation is available; draws keep flowing.
        let mut next = choice.emit_many(&ctx, 3).unwrap();
        next.sort_unstable();
        assert_eq!(next, vec![1, 2, 3]);
    }

    #[test]
    fn test_without_replacement_overdraw_fails() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        choice.emit_one(&ctx).unwrap();
        let result = choice.emit_many(&ctx, 3);
        assert!(matches!(
            result,
            Err(Error::UniquenessViolation {
                requested: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_replace_only_after_call_batches_are_unique() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3, 4, 5],
            ChoiceConfig {
                replace_only_after_call: true,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        for _ in 0..20 {
            let mut batch = choice.emit_many(&ctx, 4).unwrap();
            batch.sort_unstable();
            batch.dedup();
            assert_eq!(batch.len(), 4);
        }
    }

    #[test]
    fn test_replace_only_after_call_overdraw_fails() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3],
            ChoiceConfig {
                replace_only_after_call: true,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        assert!(matches!(
            choice.emit_many(&ctx, 4),
            Err(Error::UniquenessViolation {
                requested: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_replace_coupling_invariants() {
        let mut choice = Choice::uniform(vec![1, 2, 3]).unwrap();

        choice.set_replace(false);
        assert!(!choice.replace());
        assert!(!choice.replace_only_after_call());

        choice.set_replace_only_after_call(true);
        assert!(choice.replace());
        assert!(choice.replace_only_after_call());

        choice.set_replace(false);
        assert!(!choice.replace_only_after_call());
    }

    #[test]
    fn test_set_weights_recomputes_cum_weights() {
        let mut choice = Choice::uniform(vec!['a', 'b', 'c']).unwrap();
        assert!(choice.cum_weights().is_none());

        choice.set_weights(Some(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(choice.cum_weights(), Some(&[1.0, 3.0, 6.0][..]));

        choice.set_weights(None).unwrap();
        assert!(choice.weights().is_none());
        assert!(choice.cum_weights().is_none());
    }

    #[test]
    fn test_set_weights_rejects_bad_input_without_state_change() {
        let mut choice = Choice::weighted(vec!['a', 'b'], vec![1.0, 2.0]).unwrap();

        let result = choice.set_weights(Some(vec![1.0]));
        assert!(result.is_err());
        // Prior configuration is still intact.
        assert_eq!(choice.weights(), Some(&[1.0, 2.0][..]));
        assert_eq!(choice.cum_weights(), Some(&[1.0, 3.0][..]));
    }

    #[test]
    fn test_unique_value_metadata() {
        let with_replacement = Choice::with_config(vec![1, 1, 2], seeded(1)).unwrap();
        assert!(!with_replacement.emits_unique_values());
        assert_eq!(with_replacement.num_unique_values(), Some(2));

        let without = Choice::with_config(
            vec![1, 2, 3],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(1),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();
        assert!(without.emits_unique_values());
        assert_eq!(without.num_unique_values(), Some(3));
    }

    #[test]
    fn test_duplicate_values_void_uniqueness_guarantee() {
        // Batch modes only keep item positions distinct; duplicated
        // values must not be advertised as unique.
        let batch_unique = Choice::with_config(
            vec![1, 1, 2],
            ChoiceConfig {
                replace_only_after_call: true,
                rng_seed: Some(1),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();
        assert!(!batch_unique.emits_unique_values());

        let without = Choice::with_config(
            vec![1, 1, 2],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(1),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();
        assert!(!without.emits_unique_values());

        let distinct = Choice::with_config(
            vec![1, 2, 3],
            ChoiceConfig {
                replace_only_after_call: true,
                rng_seed: Some(1),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();
        assert!(distinct.emits_unique_values());
    }

    #[test]
    fn test_set_weights_discards_shuffle_progress() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3, 4, 5],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(42),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        choice.emit_many(&ctx, 2).unwrap();
        choice.set_weights(Some(vec![5.0, 4.0, 3.0, 2.0, 1.0])).unwrap();

        // A fresh permutation from the new weights: all five items are
        // available again, already-drawn ones included.
        let mut batch = choice.emit_many(&ctx, 5).unwrap();
        batch.sort_unstable();
        assert_eq!(batch, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_seeding_reproduces_draws() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(vec![1, 2, 3, 4, 5], seeded(99)).unwrap();

        let first: Vec<i32> = choice.emit_many(&ctx, 20).unwrap();
        choice.seed(Some(99));
        let second: Vec<i32> = choice.emit_many(&ctx, 20).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let ctx = Record::new();
        let mut choice = Choice::with_config(
            vec![1, 2, 3, 4, 5],
            ChoiceConfig {
                replace: false,
                rng_seed: Some(7),
                ..ChoiceConfig::new()
            },
        )
        .unwrap();

        let first = choice.emit_many(&ctx, 5).unwrap();
        choice.emit_many(&ctx, 2).unwrap();
        choice.reset();
        let second = choice.emit_many(&ctx, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chance_extremes() {
        let ctx = Record::new();

        let mut always = chance(1.5, Some(1)).unwrap();
        let mut never = chance(-0.5, Some(1)).unwrap();
        for _ in 0..50 {
            assert!(always.emit_one(&ctx).unwrap());
            assert!(!never.emit_one(&ctx).unwrap());
        }
    }

    #[test]
    fn test_poisson_choice_weights_peak_at_mu() {
        let choice = poisson_choice(vec![1, 2, 3, 4, 5], 2.5, 0.0, Some(1)).unwrap();
        let weights = choice.weights().unwrap();
        let peak = weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(pos, _)| pos)
            .unwrap();
        // Positions are 1-based in the weighting, so mu = 2.5 peaks at
        // position 2, index 1.
        assert_eq!(peak, 1);
    }

    #[test]
    fn test_gaussian_choice_applies_weight_floor() {
        let choice = gaussian_choice(vec![1, 2, 3, 4, 5, 6, 7, 8], 1.0, 0.5, 0.01, Some(1)).unwrap();
        assert!(choice.weights().unwrap().iter().all(|w| *w >= 0.01));
    }
}
