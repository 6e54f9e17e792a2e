//! Composable, seedable emitters for generating synthetic records.
//!
//! fixturegen builds fake-but-plausible data sets for testing and
//! benchmarking. Small value producers ("emitters") compose into
//! fields, and fields compose into schemas that stamp out whole
//! records:
//!
//! ```text
//! Schema
//!   └── Field ("title", gated, repeated, hidden?)
//!         └── Emitter (Choice, Word, Text, Static, WrapOne, ...)
//! ```
//!
//! Every stage of the tree is seedable, so one root seed reproduces an
//! entire record sequence bit for bit. Later fields can read earlier
//! fields' values, hidden fields included, which makes correlated and
//! derived columns straightforward.
//!
//! # Example
//!
//! ```
//! use fixturegen::emitters::choice::Choice;
//! use fixturegen::emitters::fixed::Sequential;
//! use fixturegen::{Field, Schema, Seedable};
//!
//! fn main() -> fixturegen::Result<()> {
//!     let mut schema = Schema::new();
//!     schema.add_field(Field::new("id", Sequential::new(vec![1_i64, 2, 3])?))?;
//!     schema.add_field(Field::new(
//!         "color",
//!         Choice::uniform(vec!["red", "green", "blue"])?,
//!     ))?;
//!     schema.seed(Some(42));
//!
//!     for record in schema.records(3) {
//!         let record = record?;
//!         println!("{}", serde_json::to_string(&record).unwrap());
//!     }
//!     Ok(())
//! }
//! ```

pub mod emitter;
pub mod emitters;
pub mod error;
pub mod math;
pub mod schema;
pub mod value;

pub use emitter::{derive_seed, Emission, Emitter, IntoValues, Seedable};
pub use error::{Error, Result};
pub use schema::{Field, RecordIter, Schema};
pub use value::{Record, SourceValues, Value};
