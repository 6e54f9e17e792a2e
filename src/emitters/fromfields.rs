//! Cross-field emitters that read previously generated field values
//! from the in-progress record.
//!
//! These consume the per-record context instead of producing fresh
//! randomness: [`CopyFields`] republishes or joins earlier values,
//! [`BasedOnFields`] derives new values from them through a
//! user-supplied function. Both declare the fields they read via
//! [`Emitter::required_fields`], which schemas check against
//! declaration order at configuration time.

use crate::emitter::{new_rng, Emitter, Seedable};
use crate::error::{Error, Result};
use crate::schema::Field;
use crate::value::{Record, SourceValues, Value};
use rand::rngs::StdRng;

/// A reference to a schema field used as a data source.
#[derive(Debug, Clone)]
struct SourceFieldRef {
    name: String,
    multi_valued: bool,
}

/// An ordered group of schema fields to read source values from.
///
/// Built from field references before the consuming field is added to
/// the schema, so the group captures each source's name and whether it
/// produces arrays.
#[derive(Debug, Clone)]
pub struct SourceFieldGroup {
    sources: Vec<SourceFieldRef>,
}

impl SourceFieldGroup {
    /// Capture references to the given fields. Fails on an empty
    /// group.
    pub fn new(fields: &[&Field]) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptySourceGroup);
        }
        Ok(Self {
            sources: fields
                .iter()
                .map(|f| SourceFieldRef {
                    name: f.name().to_string(),
                    multi_valued: f.multi_valued(),
                })
                .collect(),
        })
    }

    /// Names of the source fields, in group order.
    pub fn names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    /// Whether the group is exactly one single-valued field.
    pub fn single_valued(&self) -> bool {
        self.sources.len() == 1 && !self.sources[0].multi_valued
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look up each source's current value in the record context.
    fn gather<'a>(&'a self, ctx: &'a Record) -> Result<SourceValues<'a>> {
        let mut entries = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let value = ctx
                .get(&source.name)
                .ok_or_else(|| Error::MissingSourceValue(source.name.clone()))?;
            entries.push((source.name.as_str(), value));
        }
        Ok(SourceValues::new(entries))
    }
}

/// Emitter that copies values from earlier fields in the record.
///
/// A single single-valued source is copied as-is. Multiple sources
/// (or a multi-valued source) are flattened into one list, dropping
/// nulls from gated-off fields; with a separator the list collapses to
/// one joined string instead.
pub struct CopyFields {
    group: SourceFieldGroup,
    separator: Option<String>,
}

impl CopyFields {
    pub fn new(group: SourceFieldGroup) -> Self {
        Self {
            group,
            separator: None,
        }
    }

    /// Join the collected values into a single string using this
    /// separator.
    pub fn joined(group: SourceFieldGroup, separator: impl Into<String>) -> Self {
        Self {
            group,
            separator: Some(separator.into()),
        }
    }

    fn copy_value(&self, ctx: &Record) -> Result<Value> {
        let values = self.group.gather(ctx)?;
        if self.group.single_valued() && self.separator.is_none() {
            let (_, value) = values.iter().next().ok_or(Error::EmptySourceGroup)?;
            return Ok(value.clone());
        }

        // Flatten all sources into one list, skipping gated-off nulls.
        let mut collected: Vec<Value> = Vec::new();
        for (_, value) in values.iter() {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    collected.extend(items.iter().filter(|v| !v.is_null()).cloned());
                }
                other => collected.push(other.clone()),
            }
        }

        match &self.separator {
            Some(sep) => {
                let joined = collected
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(sep);
                Ok(Value::String(joined))
            }
            None if collected.is_empty() => Ok(Value::Null),
            None => Ok(Value::Array(collected)),
        }
    }
}

impl Seedable for CopyFields {}

impl Emitter for CopyFields {
    type Output = Value;

    fn emit_one(&mut self, ctx: &Record) -> Result<Value> {
        self.copy_value(ctx)
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<Value>> {
        // The sources hold one value per record, so every copy within
        // a record is identical.
        let value = self.copy_value(ctx)?;
        Ok(vec![value; count])
    }

    fn required_fields(&self) -> Vec<String> {
        self.group.names()
    }
}

/// How a [`BasedOnFields`] emitter derives its output.
pub enum Derivation {
    /// From the one source value; requires a single-field group.
    Single(Box<dyn FnMut(&Value, &mut StdRng) -> Result<Value> + Send>),
    /// From a name-addressable view over all source values.
    Multi(Box<dyn FnMut(&SourceValues<'_>, &mut StdRng) -> Result<Value> + Send>),
}

/// Emitter that derives new values from earlier fields through a
/// user-supplied function.
///
/// The function receives its own seedable RNG, so derived randomness
/// stays reproducible. Seeding the emitter never reaches back into the
/// source fields; those belong to the schema.
pub struct BasedOnFields {
    group: SourceFieldGroup,
    derivation: Derivation,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl BasedOnFields {
    pub fn new(group: SourceFieldGroup, derivation: Derivation) -> Result<Self> {
        if matches!(derivation, Derivation::Single(_)) && group.len() != 1 {
            return Err(Error::DerivationArity(group.len()));
        }
        Ok(Self {
            group,
            derivation,
            rng: new_rng(None),
            rng_seed: None,
        })
    }

    /// Derive from a single source field's value.
    pub fn single(
        group: SourceFieldGroup,
        func: impl FnMut(&Value, &mut StdRng) -> Result<Value> + Send + 'static,
    ) -> Result<Self> {
        Self::new(group, Derivation::Single(Box::new(func)))
    }

    /// Derive from a view over all source field values.
    pub fn multi(
        group: SourceFieldGroup,
        func: impl FnMut(&SourceValues<'_>, &mut StdRng) -> Result<Value> + Send + 'static,
    ) -> Result<Self> {
        Self::new(group, Derivation::Multi(Box::new(func)))
    }

    fn derive(&mut self, ctx: &Record) -> Result<Value> {
        let values = self.group.gather(ctx)?;
        match &mut self.derivation {
            Derivation::Single(func) => {
                let (_, value) = values.iter().next().ok_or(Error::EmptySourceGroup)?;
                func(value, &mut self.rng)
            }
            Derivation::Multi(func) => func(&values, &mut self.rng),
        }
    }
}

impl Seedable for BasedOnFields {
    fn seed(&mut self, seed: Option<u64>) {
        self.rng_seed = seed;
        self.rng = new_rng(seed);
    }

    fn reset(&mut self) {
        self.rng = new_rng(self.rng_seed);
    }
}

impl Emitter for BasedOnFields {
    type Output = Value;

    fn emit_one(&mut self, ctx: &Record) -> Result<Value> {
        self.derive(ctx)
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<Value>> {
        (0..count).map(|_| self.derive(ctx)).collect()
    }

    fn required_fields(&self) -> Vec<String> {
        self.group.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::fixed::Static;
    use crate::schema::Field;

    fn source_field(name: &str) -> Field {
        Field::new(name, Static::new(0_i64))
    }

    fn multi_source_field(name: &str) -> Field {
        Field::new(name, Static::new(0_i64)).with_repeat(Static::new(2_usize))
    }

    #[test]
    fn test_group_rejects_empty() {
        assert!(matches!(
            SourceFieldGroup::new(&[]),
            Err(Error::EmptySourceGroup)
        ));
    }

    #[test]
    fn test_group_single_valued() {
        let single = source_field("a");
        let multi = multi_source_field("b");

        assert!(SourceFieldGroup::new(&[&single]).unwrap().single_valued());
        assert!(!SourceFieldGroup::new(&[&multi]).unwrap().single_valued());
        assert!(!SourceFieldGroup::new(&[&single, &multi])
            .unwrap()
            .single_valued());
    }

    #[test]
    fn test_copy_single_value_as_is() {
        let field = source_field("src");
        let group = SourceFieldGroup::new(&[&field]).unwrap();
        let mut copy = CopyFields::new(group);

        let mut ctx = Record::new();
        ctx.insert("src", Value::Int(42));
        assert_eq!(copy.emit_one(&ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_copy_flattens_and_skips_nulls() {
        let a = source_field("a");
        let b = multi_source_field("b");
        let c = source_field("c");
        let group = SourceFieldGroup::new(&[&a, &b, &c]).unwrap();
        let mut copy = CopyFields::new(group);

        let mut ctx = Record::new();
        ctx.insert("a", Value::Int(1));
        ctx.insert(
            "b",
            Value::Array(vec![Value::Int(2), Value::Null, Value::Int(3)]),
        );
        ctx.insert("c", Value::Null);

        assert_eq!(
            copy.emit_one(&ctx).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_copy_all_nulls_collapses_to_null() {
        let a = source_field("a");
        let b = source_field("b");
        let group = SourceFieldGroup::new(&[&a, &b]).unwrap();
        let mut copy = CopyFields::new(group);

        let mut ctx = Record::new();
        ctx.insert("a", Value::Null);
        ctx.insert("b", Value::Null);
        assert_eq!(copy.emit_one(&ctx).unwrap(), Value::Null);
    }

    #[test]
    fn test_copy_joined_string() {
        let a = source_field("a");
        let b = source_field("b");
        let group = SourceFieldGroup::new(&[&a, &b]).unwrap();
        let mut copy = CopyFields::joined(group, "-");

        let mut ctx = Record::new();
        ctx.insert("a", Value::from("x"));
        ctx.insert("b", Value::Int(7));
        assert_eq!(copy.emit_one(&ctx).unwrap(), Value::from("x-7"));
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let field = source_field("src");
        let group = SourceFieldGroup::new(&[&field]).unwrap();
        let mut copy = CopyFields::new(group);

        let ctx = Record::new();
        assert!(matches!(
            copy.emit_one(&ctx),
            Err(Error::MissingSourceValue(_))
        ));
    }

    #[test]
    fn test_copy_emit_many_repeats_record_value() {
        let field = source_field("src");
        let group = SourceFieldGroup::new(&[&field]).unwrap();
        let mut copy = CopyFields::new(group);

        let mut ctx = Record::new();
        ctx.insert("src", Value::Int(5));
        assert_eq!(
            copy.emit_many(&ctx, 3).unwrap(),
            vec![Value::Int(5); 3]
        );
    }

    #[test]
    fn test_based_on_single_derivation() {
        let field = source_field("n");
        let group = SourceFieldGroup::new(&[&field]).unwrap();
        let mut based = BasedOnFields::single(group, |value, _rng| {
            Ok(Value::Int(value.as_i64().unwrap_or(0) * 2))
        })
        .unwrap();

        let mut ctx = Record::new();
        ctx.insert("n", Value::Int(21));
        assert_eq!(based.emit_one(&ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_based_on_single_rejects_multi_group() {
        let a = source_field("a");
        let b = source_field("b");
        let group = SourceFieldGroup::new(&[&a, &b]).unwrap();

        let result = BasedOnFields::single(group, |value, _rng| Ok(value.clone()));
        assert!(matches!(result, Err(Error::DerivationArity(2))));
    }

    #[test]
    fn test_based_on_multi_derivation() {
        let a = source_field("a");
        let b = source_field("b");
        let group = SourceFieldGroup::new(&[&a, &b]).unwrap();
        let mut based = BasedOnFields::multi(group, |view, _rng| {
            let a = view.require("a")?.as_i64().unwrap_or(0);
            let b = view.require("b")?.as_i64().unwrap_or(0);
            Ok(Value::Int(a + b))
        })
        .unwrap();

        let mut ctx = Record::new();
        ctx.insert("a", Value::Int(40));
        ctx.insert("b", Value::Int(2));
        assert_eq!(based.emit_one(&ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_based_on_seeded_randomness_is_reproducible() {
        let make = || {
            let field = source_field("n");
            let group = SourceFieldGroup::new(&[&field]).unwrap();
            let mut based = BasedOnFields::single(group, |value, rng| {
                use rand::Rng;
                let jitter: i64 = rng.random_range(0..100);
                Ok(Value::Int(value.as_i64().unwrap_or(0) + jitter))
            })
            .unwrap();
            based.seed(Some(42));
            based
        };

        let mut ctx = Record::new();
        ctx.insert("n", Value::Int(1000));
        assert_eq!(
            make().emit_many(&ctx, 5).unwrap(),
            make().emit_many(&ctx, 5).unwrap()
        );
    }

    #[test]
    fn test_required_fields_reports_sources() {
        let a = source_field("a");
        let b = source_field("b");
        let group = SourceFieldGroup::new(&[&a, &b]).unwrap();
        let copy = CopyFields::new(group);

        assert_eq!(copy.required_fields(), vec!["a", "b"]);
    }
}
