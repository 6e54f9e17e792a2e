//! Field and schema orchestration.
//!
//! A [`Field`] wraps a value emitter with optional gating (should this
//! record get a value at all?), repetition (how many values?), and
//! visibility. A [`Schema`] runs its fields in declaration order to
//! produce one [`Record`] per generation cycle, giving each field's
//! emitter read access to everything generated earlier in the same
//! record.

use crate::emitter::{derive_child_seed, Emitter, IntoValues, Seedable};
use crate::error::{Error, Result};
use crate::value::{Record, Value};
use std::collections::HashMap;
use tracing::trace;

/// A named output slot in a schema.
pub struct Field {
    name: String,
    emitter: Box<dyn Emitter<Output = Value> + Send>,
    gate: Option<Box<dyn Emitter<Output = bool> + Send>>,
    repeat: Option<Box<dyn Emitter<Output = usize> + Send>>,
    hide: bool,
    rng_seed: Option<u64>,
}

impl Field {
    /// A single-valued, ungated, visible field around any emitter
    /// whose output converts into a [`Value`].
    pub fn new<E>(name: impl Into<String>, emitter: E) -> Self
    where
        E: Emitter + Send + 'static,
        E::Output: Into<Value>,
    {
        Self {
            name: name.into(),
            emitter: Box::new(IntoValues::new(emitter)),
            gate: None,
            repeat: None,
            hide: false,
            rng_seed: None,
        }
    }

    /// Gate the field: when the gate emits `false` for a record, the
    /// field's value is null and the wrapped emitter is not consulted
    /// (its internal state does not advance).
    pub fn with_gate(mut self, gate: impl Emitter<Output = bool> + Send + 'static) -> Self {
        self.gate = Some(Box::new(gate));
        self
    }

    /// Make the field multi-valued: each record gets an array of as
    /// many values as the repeat emitter dictates.
    pub fn with_repeat(mut self, repeat: impl Emitter<Output = usize> + Send + 'static) -> Self {
        self.repeat = Some(Box::new(repeat));
        self
    }

    /// Generate into the record context but leave the field out of the
    /// public output.
    pub fn hidden(mut self) -> Self {
        self.hide = true;
        self
    }

    /// Seed the field (and all its component emitters) at construction
    /// time.
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.seed(Some(rng_seed));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.hide
    }

    /// Whether the field produces arrays. Equivalent to having a
    /// repeat emitter.
    pub fn multi_valued(&self) -> bool {
        self.repeat.is_some()
    }

    /// Names of earlier fields this field's emitters read from.
    pub fn required_fields(&self) -> Vec<String> {
        let mut required = self.emitter.required_fields();
        let children = [
            self.gate.as_ref().map(|g| g.required_fields()),
            self.repeat.as_ref().map(|r| r.required_fields()),
        ];
        for names in children.into_iter().flatten() {
            for name in names {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        required
    }

    /// Produce this field's value for the record being generated.
    pub fn generate(&mut self, ctx: &Record) -> Result<Value> {
        if let Some(gate) = &mut self.gate {
            if !gate.emit_one(ctx)? {
                return Ok(Value::Null);
            }
        }
        match &mut self.repeat {
            Some(repeat) => {
                let count = repeat.emit_one(ctx)?;
                Ok(Value::Array(self.emitter.emit_many(ctx, count)?))
            }
            None => self.emitter.emit_one(ctx),
        }
    }
}

impl Seedable for Field {
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.emitter.seed(derive_child_seed(seed, 0));
        if let Some(repeat) = &mut self.repeat {
            repeat.seed(derive_child_seed(seed, 1));
        }
        if let Some(gate) = &mut self.gate {
            gate.seed(derive_child_seed(seed, 2));
        }
    }

    fn reset(&mut self) {
        self.emitter.reset();
        if let Some(repeat) = &mut self.repeat {
            repeat.reset();
        }
        if let Some(gate) = &mut self.gate {
            gate.reset();
        }
    }
}

/// An ordered collection of fields that generates whole records.
#[derive(Default)]
pub struct Schema {
    fields: Vec<Field>,
    field_map: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from fields in one go.
    pub fn with_fields(fields: Vec<Field>) -> Result<Self> {
        let mut schema = Self::new();
        for field in fields {
            schema.add_field(field)?;
        }
        Ok(schema)
    }

    /// Append a field, or replace the existing field with the same
    /// name in place.
    ///
    /// Every source field the new field reads from must already be
    /// declared earlier in the schema; a forward or dangling reference
    /// fails here, at configuration time.
    pub fn add_field(&mut self, field: Field) -> Result<()> {
        let insert_at = self
            .field_map
            .get(field.name())
            .copied()
            .unwrap_or(self.fields.len());
        for source in field.required_fields() {
            match self.field_map.get(&source) {
                Some(&pos) if pos < insert_at => {}
                _ => {
                    return Err(Error::UnknownSourceField {
                        field: field.name().to_string(),
                        source_name: source,
                    });
                }
            }
        }
        match self.field_map.get(field.name()) {
            Some(&pos) => self.fields[pos] = field,
            None => {
                self.field_map
                    .insert(field.name().to_string(), self.fields.len());
                self.fields.push(field);
            }
        }
        Ok(())
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&pos| &self.fields[pos])
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Fields that appear in generated output, in declaration order.
    pub fn public_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| !f.is_hidden()).collect()
    }

    /// Fields generated for context only, in declaration order.
    pub fn hidden_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_hidden()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Generate one record.
    ///
    /// Fields run in declaration order; each sees the values of every
    /// field before it. Hidden fields participate in the context but
    /// are dropped from the returned record.
    pub fn generate(&mut self) -> Result<Record> {
        let mut ctx = Record::with_capacity(self.fields.len());
        for field in &mut self.fields {
            let value = field.generate(&ctx)?;
            trace!(field = field.name(), hidden = field.is_hidden(), "generated field");
            ctx.insert(field.name(), value);
        }

        if self.fields.iter().all(|f| !f.is_hidden()) {
            return Ok(ctx);
        }
        let mut record = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            if !field.is_hidden() {
                if let Some(value) = ctx.get(field.name()) {
                    record.insert(field.name(), value.clone());
                }
            }
        }
        Ok(record)
    }

    /// Lazily generate `count` records.
    pub fn records(&mut self, count: usize) -> RecordIter<'_> {
        RecordIter {
            schema: self,
            remaining: count,
        }
    }
}

impl Seedable for Schema {
    /// Cascade the seed over fields in declaration order, handing each
    /// a distinct derived sub-seed, so one root seed reproduces whole
    /// record sequences.
    fn seed(&mut self, seed: Option<u64>) {
        for (ordinal, field) in self.fields.iter_mut().enumerate() {
            field.seed(derive_child_seed(seed, ordinal as u64));
        }
    }

    fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }
}

/// Lazy record iterator returned by [`Schema::records`].
pub struct RecordIter<'a> {
    schema: &'a mut Schema,
    remaining: usize,
}

impl Iterator for RecordIter<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.schema.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RecordIter<'_> {}
