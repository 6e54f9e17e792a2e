//! The emitter and seedable capability contracts.
//!
//! Every value producer in the crate, leaf or composite, implements
//! [`Emitter`]: emit one value, or emit a batch of an exact size.
//! Anything owning pseudorandom state also implements [`Seedable`] so a
//! whole generation tree can be made reproducible from a single root
//! seed.

use crate::error::Result;
use crate::value::{Record, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Golden-ratio mixing constant used for deriving child seeds.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derives a deterministic child seed from a parent seed and the
/// child's fixed ordinal position.
///
/// Children of one parent get statistically independent streams while
/// the full tree stays reproducible from the root seed. The mix runs
/// the golden-ratio product through a splitmix64 finalizer so that
/// siblings at different tree depths cannot collide on trivially
/// related seed values.
pub fn derive_seed(seed: u64, ordinal: u64) -> u64 {
    let mut z = seed ^ ordinal.wrapping_add(1).wrapping_mul(SEED_MIX);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Option-aware variant of [`derive_seed`]; an unseeded parent leaves
/// its children unseeded (OS entropy) as well.
pub fn derive_child_seed(seed: Option<u64>, ordinal: u64) -> Option<u64> {
    seed.map(|s| derive_seed(s, ordinal))
}

/// Build an RNG from an optional seed; `None` draws from OS entropy.
pub(crate) fn new_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Capability for anything that owns pseudorandom or cursor state.
///
/// Both methods default to no-ops so stateless producers can opt in
/// with an empty impl block.
pub trait Seedable {
    /// Deterministically reset the owned generator(s). Owners of child
    /// seedables cascade in a fixed declaration order, handing each
    /// child a distinct derived sub-seed. `None` re-randomizes from OS
    /// entropy.
    fn seed(&mut self, seed: Option<u64>) {
        let _ = seed;
    }

    /// Restore initial state using the stored seed, losing any cursor
    /// or shuffle progress.
    fn reset(&mut self) {}
}

/// Result of the unifying [`Emitter::emit`] call form.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission<T> {
    /// A single value (no count was requested)
    One(T),
    /// A batch of exactly the requested count
    Many(Vec<T>),
}

impl<T> Emission<T> {
    /// Unwrap a single emission, if this is one.
    pub fn into_one(self) -> Option<T> {
        match self {
            Self::One(v) => Some(v),
            Self::Many(_) => None,
        }
    }

    /// Unwrap a batch emission, if this is one.
    pub fn into_many(self) -> Option<Vec<T>> {
        match self {
            Self::One(_) => None,
            Self::Many(vs) => Some(vs),
        }
    }
}

/// A stateful value producer.
///
/// Emitters are not idempotent: internal cursors (RNG state, iterator
/// and shuffle positions) advance with every invocation. The `ctx`
/// argument is the in-progress record for the current generation pass;
/// leaf emitters ignore it, cross-field emitters read sibling values
/// from it.
pub trait Emitter: Seedable {
    type Output;

    /// Produce one value.
    fn emit_one(&mut self, ctx: &Record) -> Result<Self::Output>;

    /// Produce exactly `count` values, or fail.
    ///
    /// A batch must never silently come back short: if `count`
    /// distinct/valid values cannot be produced under the current
    /// configuration, the call errors.
    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<Self::Output>>;

    /// True if outputs within one batch are guaranteed distinct.
    fn emits_unique_values(&self) -> bool {
        false
    }

    /// Bound on the number of distinct values this emitter can
    /// produce; `None` when unbounded or unknowable (e.g. an infinite
    /// counter).
    fn num_unique_values(&self) -> Option<u64> {
        None
    }

    /// Names of already-computed record fields this emitter reads.
    ///
    /// Schemas use this to validate cross-field references at
    /// configuration time. Composite emitters aggregate their
    /// children's requirements.
    fn required_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// Unifying call form: no count emits one value, a count emits a
    /// batch of that length.
    fn emit(&mut self, ctx: &Record, count: Option<usize>) -> Result<Emission<Self::Output>> {
        match count {
            None => Ok(Emission::One(self.emit_one(ctx)?)),
            Some(n) => Ok(Emission::Many(self.emit_many(ctx, n)?)),
        }
    }
}

/// Adapter that lifts any emitter whose output converts into [`Value`]
/// to an `Emitter<Output = Value>`, so fields can wrap producers of
/// plain Rust types directly.
pub struct IntoValues<E> {
    inner: E,
}

impl<E> IntoValues<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Seedable> Seedable for IntoValues<E> {
    fn seed(&mut self, seed: Option<u64>) {
        self.inner.seed(seed);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

impl<E> Emitter for IntoValues<E>
where
    E: Emitter,
    E::Output: Into<Value>,
{
    type Output = Value;

    fn emit_one(&mut self, ctx: &Record) -> Result<Value> {
        Ok(self.inner.emit_one(ctx)?.into())
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<Value>> {
        Ok(self
            .inner
            .emit_many(ctx, count)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    fn emits_unique_values(&self) -> bool {
        self.inner.emits_unique_values()
    }

    fn num_unique_values(&self) -> Option<u64> {
        self.inner.num_unique_values()
    }

    fn required_fields(&self) -> Vec<String> {
        self.inner.required_fields()
    }
}
