//! Deterministic, non-random emitters: constants, cycling sequences,
//! and restartable iterators.

use crate::emitter::{Emitter, Seedable};
use crate::error::{Error, Result};
use crate::value::Record;

/// Emits the same value forever.
pub struct Static<T> {
    value: T,
}

impl<T: Clone> Static<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// The constant being emitted.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Seedable for Static<T> {}

impl<T: Clone> Emitter for Static<T> {
    type Output = T;

    fn emit_one(&mut self, _ctx: &Record) -> Result<T> {
        Ok(self.value.clone())
    }

    fn emit_many(&mut self, _ctx: &Record, count: usize) -> Result<Vec<T>> {
        Ok(vec![self.value.clone(); count])
    }

    fn num_unique_values(&self) -> Option<u64> {
        Some(1)
    }
}

/// Emits items from a fixed sequence in order, wrapping around at the
/// end.
///
/// With `reset_after_call` the cursor rewinds to the start after every
/// call instead of persisting across calls.
pub struct Sequential<T> {
    items: Vec<T>,
    pos: usize,
    reset_after_call: bool,
}

impl<T: Clone + PartialEq> Sequential<T> {
    pub fn new(items: Vec<T>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyItems);
        }
        Ok(Self {
            items,
            pos: 0,
            reset_after_call: false,
        })
    }

    /// Rewind the cursor after every call, so each call starts from
    /// the first item.
    pub fn reset_after_call(mut self, reset: bool) -> Self {
        self.reset_after_call = reset;
        self
    }

    /// The sequence being cycled.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    fn next_item(&mut self) -> T {
        let item = self.items[self.pos].clone();
        self.pos = (self.pos + 1) % self.items.len();
        item
    }
}

impl<T: Clone + PartialEq> Seedable for Sequential<T> {
    fn reset(&mut self) {
        self.pos = 0;
    }
}

impl<T: Clone + PartialEq> Emitter for Sequential<T> {
    type Output = T;

    fn emit_one(&mut self, _ctx: &Record) -> Result<T> {
        let item = self.next_item();
        if self.reset_after_call {
            self.pos = 0;
        }
        Ok(item)
    }

    fn emit_many(&mut self, _ctx: &Record, count: usize) -> Result<Vec<T>> {
        let batch = (0..count).map(|_| self.next_item()).collect();
        if self.reset_after_call {
            self.pos = 0;
        }
        Ok(batch)
    }

    fn num_unique_values(&self) -> Option<u64> {
        let mut seen: Vec<&T> = Vec::new();
        for item in &self.items {
            if !seen.iter().any(|s| *s == item) {
                seen.push(item);
            }
        }
        Some(seen.len() as u64)
    }
}

/// Emits from iterators produced by a factory closure, starting a
/// fresh iterator whenever the current one runs out.
///
/// The factory lets the emitter be reset and lets exhaustion restart
/// the stream; a factory whose iterators are empty is rejected at
/// construction.
pub struct Iterative<I: Iterator> {
    factory: Box<dyn Fn() -> I + Send>,
    current: I,
}

impl<I: Iterator> Iterative<I> {
    pub fn new(factory: impl Fn() -> I + Send + 'static) -> Result<Self> {
        let mut probe = factory();
        match probe.next() {
            Some(_) => Ok(Self {
                current: factory(),
                factory: Box::new(factory),
            }),
            None => Err(Error::EmptyIterator),
        }
    }

    fn next_value(&mut self) -> I::Item {
        loop {
            match self.current.next() {
                Some(v) => return v,
                // Construction proved the factory non-empty, so the
                // restarted iterator yields on the next pass.
                None => self.current = (self.factory)(),
            }
        }
    }
}

impl<I: Iterator> Seedable for Iterative<I> {
    fn reset(&mut self) {
        self.current = (self.factory)();
    }
}

impl<I: Iterator> Emitter for Iterative<I> {
    type Output = I::Item;

    fn emit_one(&mut self, _ctx: &Record) -> Result<I::Item> {
        Ok(self.next_value())
    }

    fn emit_many(&mut self, _ctx: &Record, count: usize) -> Result<Vec<I::Item>> {
        Ok((0..count).map(|_| self.next_value()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_repeats_value() {
        let ctx = Record::new();
        let mut fixed = Static::new("const");

        assert_eq!(fixed.emit_one(&ctx).unwrap(), "const");
        assert_eq!(fixed.emit_many(&ctx, 3).unwrap(), vec!["const"; 3]);
        assert_eq!(fixed.num_unique_values(), Some(1));
    }

    #[test]
    fn test_sequential_rejects_empty() {
        assert!(matches!(
            Sequential::<i64>::new(vec![]),
            Err(Error::EmptyItems)
        ));
    }

    #[test]
    fn test_sequential_cycles() {
        let ctx = Record::new();
        let mut seq = Sequential::new(vec![1, 2, 3]).unwrap();

        assert_eq!(seq.emit_many(&ctx, 7).unwrap(), vec![1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(seq.emit_one(&ctx).unwrap(), 2);
    }

    #[test]
    fn test_sequential_reset_after_call() {
        let ctx = Record::new();
        let mut seq = Sequential::new(vec![1, 2, 3]).unwrap().reset_after_call(true);

        assert_eq!(seq.emit_many(&ctx, 2).unwrap(), vec![1, 2]);
        assert_eq!(seq.emit_many(&ctx, 2).unwrap(), vec![1, 2]);
        assert_eq!(seq.emit_one(&ctx).unwrap(), 1);
        assert_eq!(seq.emit_one(&ctx).unwrap(), 1);
    }

    #[test]
    fn test_sequential_reset_rewinds() {
        let ctx = Record::new();
        let mut seq = Sequential::new(vec![1, 2, 3]).unwrap();

        seq.emit_many(&ctx, 2).unwrap();
        seq.reset();
        assert_eq!(seq.emit_one(&ctx).unwrap(), 1);
    }

    #[test]
    fn test_sequential_counts_distinct_items() {
        let seq = Sequential::new(vec![1, 2, 2, 3, 1]).unwrap();
        assert_eq!(seq.num_unique_values(), Some(3));
    }

    #[test]
    fn test_iterative_rejects_empty_factory() {
        let result = Iterative::new(|| std::iter::empty::<i64>());
        assert!(matches!(result, Err(Error::EmptyIterator)));
    }

    #[test]
    fn test_iterative_restarts_on_exhaustion() {
        let ctx = Record::new();
        let mut iterative = Iterative::new(|| 0..3).unwrap();

        assert_eq!(
            iterative.emit_many(&ctx, 7).unwrap(),
            vec![0, 1, 2, 0, 1, 2, 0]
        );
    }

    #[test]
    fn test_iterative_reset() {
        let ctx = Record::new();
        let mut iterative = Iterative::new(|| 10..20).unwrap();

        iterative.emit_many(&ctx, 4).unwrap();
        iterative.reset();
        assert_eq!(iterative.emit_one(&ctx).unwrap(), 10);
    }
}
