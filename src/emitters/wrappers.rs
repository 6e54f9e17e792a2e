//! Wrapper emitters that post-process the output of other emitters.
//!
//! [`WrapOne`] transforms a single source's output value by value;
//! [`WrapMany`] gathers one value from each of several named sources
//! and combines them. Both own an RNG handed to the transform closure
//! so wrapped randomness stays seedable.

use crate::emitter::{derive_child_seed, new_rng, Emitter, Seedable};
use crate::error::{Error, Result};
use crate::value::{Record, SourceValues, Value};
use rand::rngs::StdRng;

/// Emitter that transforms each value produced by one source emitter.
pub struct WrapOne<E: Emitter, T> {
    source: E,
    func: Box<dyn FnMut(E::Output, &mut StdRng) -> Result<T> + Send>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<E: Emitter, T> WrapOne<E, T> {
    pub fn new(
        source: E,
        func: impl FnMut(E::Output, &mut StdRng) -> Result<T> + Send + 'static,
    ) -> Self {
        Self {
            source,
            func: Box::new(func),
            rng: new_rng(None),
            rng_seed: None,
        }
    }

    /// Seed the wrapper (and, transitively, its source) at
    /// construction time.
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.seed(Some(rng_seed));
        self
    }

    /// The wrapped source emitter.
    pub fn source(&self) -> &E {
        &self.source
    }
}

impl<E: Emitter, T> Seedable for WrapOne<E, T> {
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.rng = new_rng(seed);
        self.source.seed(derive_child_seed(seed, 0));
    }

    fn reset(&mut self) {
        self.rng = new_rng(self.rng_seed);
        self.source.reset();
    }
}

impl<E: Emitter, T> Emitter for WrapOne<E, T> {
    type Output = T;

    fn emit_one(&mut self, ctx: &Record) -> Result<T> {
        let raw = self.source.emit_one(ctx)?;
        (self.func)(raw, &mut self.rng)
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<T>> {
        self.source
            .emit_many(ctx, count)?
            .into_iter()
            .map(|raw| (self.func)(raw, &mut self.rng))
            .collect()
    }

    // Uniqueness metadata is not forwarded: a transform may collapse
    // distinct inputs onto one output.
    fn required_fields(&self) -> Vec<String> {
        self.source.required_fields()
    }
}

/// Emitter that combines one value from each of several named source
/// emitters into a single output.
///
/// For each output, every source emits exactly once; the combining
/// closure reads the results through a name-addressable
/// [`SourceValues`] view.
pub struct WrapMany<T> {
    sources: Vec<(String, Box<dyn Emitter<Output = Value> + Send>)>,
    func: Box<dyn FnMut(&SourceValues<'_>, &mut StdRng) -> Result<T> + Send>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<T> WrapMany<T> {
    pub fn new(
        sources: Vec<(String, Box<dyn Emitter<Output = Value> + Send>)>,
        func: impl FnMut(&SourceValues<'_>, &mut StdRng) -> Result<T> + Send + 'static,
    ) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::EmptySources);
        }
        Ok(Self {
            sources,
            func: Box::new(func),
            rng: new_rng(None),
            rng_seed: None,
        })
    }

    /// Seed the wrapper and all its sources at construction time.
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.seed(Some(rng_seed));
        self
    }
}

impl<T> Seedable for WrapMany<T> {
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.rng = new_rng(seed);
        for (ordinal, (_, source)) in self.sources.iter_mut().enumerate() {
            source.seed(derive_child_seed(seed, ordinal as u64));
        }
    }

    fn reset(&mut self) {
        self.rng = new_rng(self.rng_seed);
        for (_, source) in &mut self.sources {
            source.reset();
        }
    }
}

impl<T> Emitter for WrapMany<T> {
    type Output = T;

    fn emit_one(&mut self, ctx: &Record) -> Result<T> {
        let gathered: Vec<(String, Value)> = self
            .sources
            .iter_mut()
            .map(|(name, source)| Ok((name.clone(), source.emit_one(ctx)?)))
            .collect::<Result<_>>()?;
        let view = SourceValues::new(
            gathered
                .iter()
                .map(|(name, value)| (name.as_str(), value))
                .collect(),
        );
        (self.func)(&view, &mut self.rng)
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<T>> {
        // One batched emit per source, then one view per output index.
        let columns: Vec<(&str, Vec<Value>)> = self
            .sources
            .iter_mut()
            .map(|(name, source)| Ok((name.as_str(), source.emit_many(ctx, count)?)))
            .collect::<Result<_>>()?;

        let mut outputs = Vec::with_capacity(count);
        for i in 0..count {
            let view = SourceValues::new(
                columns
                    .iter()
                    .map(|(name, values)| (*name, &values[i]))
                    .collect(),
            );
            outputs.push((self.func)(&view, &mut self.rng)?);
        }
        Ok(outputs)
    }

    fn required_fields(&self) -> Vec<String> {
        let mut required = Vec::new();
        for (_, source) in &self.sources {
            for name in source.required_fields() {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::fixed::{Sequential, Static};
    use crate::emitter::IntoValues;

    #[test]
    fn test_wrap_one_transforms_each_value() {
        let ctx = Record::new();
        let source = Sequential::new(vec![1_i64, 2, 3]).unwrap();
        let mut wrapped = WrapOne::new(source, |v, _rng| Ok(v * 10));

        assert_eq!(wrapped.emit_one(&ctx).unwrap(), 10);
        assert_eq!(wrapped.emit_many(&ctx, 2).unwrap(), vec![20, 30]);
    }

    #[test]
    fn test_wrap_one_propagates_closure_failure() {
        let ctx = Record::new();
        let source = Static::new(-1_i64);
        let mut wrapped = WrapOne::new(source, |v, _rng| {
            if v < 0 {
                Err(Error::Derivation("negative input".to_string()))
            } else {
                Ok(v)
            }
        });

        assert!(matches!(
            wrapped.emit_one(&ctx),
            Err(Error::Derivation(_))
        ));
    }

    #[test]
    fn test_wrap_one_seeding_is_reproducible() {
        let ctx = Record::new();
        let make = || {
            WrapOne::new(Static::new(0_i64), |v, rng| {
                use rand::Rng;
                Ok(v + rng.random_range(0..1000))
            })
            .with_rng_seed(42)
        };

        let first = make().emit_many(&ctx, 10).unwrap();
        let second = make().emit_many(&ctx, 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrap_many_requires_sources() {
        let result = WrapMany::<Value>::new(vec![], |_view, _rng| Ok(Value::Null));
        assert!(matches!(result, Err(Error::EmptySources)));
    }

    #[test]
    fn test_wrap_many_combines_named_sources() {
        let ctx = Record::new();
        let sources: Vec<(String, Box<dyn Emitter<Output = Value> + Send>)> = vec![
            (
                "n".to_string(),
                Box::new(IntoValues::new(Sequential::new(vec![1_i64, 2]).unwrap())),
            ),
            (
                "label".to_string(),
                Box::new(IntoValues::new(Static::new("x"))),
            ),
        ];
        let mut combined = WrapMany::new(sources, |view, _rng| {
            let n = view.require("n")?.as_i64().unwrap_or(0);
            let label = view.require("label")?.to_string();
            Ok(Value::from(format!("{label}{n}")))
        })
        .unwrap();

        assert_eq!(combined.emit_one(&ctx).unwrap(), Value::from("x1"));
        assert_eq!(
            combined.emit_many(&ctx, 2).unwrap(),
            vec![Value::from("x2"), Value::from("x1")]
        );
    }

    #[test]
    fn test_wrap_many_missing_name_fails() {
        let ctx = Record::new();
        let sources: Vec<(String, Box<dyn Emitter<Output = Value> + Send>)> = vec![(
            "a".to_string(),
            Box::new(IntoValues::new(Static::new(1_i64))),
        )];
        let mut combined =
            WrapMany::new(sources, |view, _rng| Ok(view.require("b")?.clone())).unwrap();

        assert!(matches!(
            combined.emit_one(&ctx),
            Err(Error::MissingSourceValue(_))
        ));
    }
}
