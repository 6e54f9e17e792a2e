//! Synthetic word and text emitters.
//!
//! [`Word`] assembles strings character by character from an alphabet
//! emitter, using a length emitter for each word's size. [`Text`]
//! assembles sentences from a word emitter, a word-count emitter, and
//! a separator emitter. Plugging in weighted [`Choice`] emitters at
//! each level yields naturalistic letter and length distributions.
//!
//! [`Choice`]: crate::emitters::choice::Choice

use crate::emitter::{derive_child_seed, Emitter, Seedable};
use crate::emitters::fixed::Static;
use crate::error::Result;
use crate::value::Record;

/// Expand inclusive Unicode codepoint ranges into a character list.
///
/// Codepoints that do not map to valid characters (the surrogate
/// range) are skipped.
pub fn make_alphabet(ranges: &[(u32, u32)]) -> Vec<char> {
    ranges
        .iter()
        .flat_map(|&(lo, hi)| (lo..=hi).filter_map(char::from_u32))
        .collect()
}

/// The default alphabet: printable Latin characters minus quotes,
/// whitespace, and a few symbols that read poorly in generated text.
pub fn default_alphabet() -> Vec<char> {
    make_alphabet(&[
        (0x21, 0x21),
        (0x23, 0x26),
        (0x28, 0x7E),
        (0xA1, 0xAC),
        (0xAE, 0xFF),
    ])
}

/// Emitter that builds words from per-character selections.
pub struct Word {
    length: Box<dyn Emitter<Output = usize> + Send>,
    alphabet: Box<dyn Emitter<Output = char> + Send>,
}

impl Word {
    pub fn new(
        length: impl Emitter<Output = usize> + Send + 'static,
        alphabet: impl Emitter<Output = char> + Send + 'static,
    ) -> Self {
        Self {
            length: Box::new(length),
            alphabet: Box::new(alphabet),
        }
    }
}

impl Seedable for Word {
    fn seed(&mut self, seed: Option<u64>) {
        self.length.seed(derive_child_seed(seed, 0));
        self.alphabet.seed(derive_child_seed(seed, 1));
    }

    fn reset(&mut self) {
        self.length.reset();
        self.alphabet.reset();
    }
}

impl Emitter for Word {
    type Output = String;

    fn emit_one(&mut self, ctx: &Record) -> Result<String> {
        let len = self.length.emit_one(ctx)?;
        let chars = self.alphabet.emit_many(ctx, len)?;
        Ok(chars.into_iter().collect())
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<String>> {
        // One batched character draw for the whole call, then carve
        // the stream into words.
        let lengths = self.length.emit_many(ctx, count)?;
        let total: usize = lengths.iter().sum();
        let mut chars = self.alphabet.emit_many(ctx, total)?.into_iter();

        Ok(lengths
            .into_iter()
            .map(|len| chars.by_ref().take(len).collect())
            .collect())
    }

    fn required_fields(&self) -> Vec<String> {
        let mut required = self.length.required_fields();
        for name in self.alphabet.required_fields() {
            if !required.contains(&name) {
                required.push(name);
            }
        }
        required
    }
}

/// Emitter that builds sentence-like strings from words.
///
/// Each output draws a word count, that many words, and one fewer
/// separator; a zero word count produces an empty string.
pub struct Text {
    numwords: Box<dyn Emitter<Output = usize> + Send>,
    word: Box<dyn Emitter<Output = String> + Send>,
    sep: Box<dyn Emitter<Output = String> + Send>,
}

impl Text {
    /// A text emitter with the default single-space separator.
    pub fn new(
        numwords: impl Emitter<Output = usize> + Send + 'static,
        word: impl Emitter<Output = String> + Send + 'static,
    ) -> Self {
        Self {
            numwords: Box::new(numwords),
            word: Box::new(word),
            sep: Box::new(Static::new(" ".to_string())),
        }
    }

    /// Replace the separator emitter, e.g. a weighted choice over
    /// punctuation.
    pub fn with_separator(
        mut self,
        sep: impl Emitter<Output = String> + Send + 'static,
    ) -> Self {
        self.sep = Box::new(sep);
        self
    }

    /// Fetch `total` words, chunking the requests when the word
    /// emitter's batches are unique-constrained and the total exceeds
    /// its distinct capacity.
    fn collect_words(&mut self, ctx: &Record, total: usize) -> Result<Vec<String>> {
        if total == 0 {
            return Ok(Vec::new());
        }
        let chunk = match self.word.num_unique_values() {
            Some(capacity)
                if self.word.emits_unique_values() && (total as u64) > capacity =>
            {
                capacity as usize
            }
            _ => total,
        };

        let mut words = Vec::with_capacity(total);
        let mut remaining = total;
        while remaining > 0 {
            let take = remaining.min(chunk);
            words.extend(self.word.emit_many(ctx, take)?);
            remaining -= take;
        }
        Ok(words)
    }

    fn assemble(words: &[String], seps: &mut impl Iterator<Item = String>) -> String {
        let mut text = String::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                if let Some(sep) = seps.next() {
                    text.push_str(&sep);
                }
            }
            text.push_str(word);
        }
        text
    }
}

impl Seedable for Text {
    fn seed(&mut self, seed: Option<u64>) {
        self.numwords.seed(derive_child_seed(seed, 0));
        self.word.seed(derive_child_seed(seed, 1));
        self.sep.seed(derive_child_seed(seed, 2));
    }

    fn reset(&mut self) {
        self.numwords.reset();
        self.word.reset();
        self.sep.reset();
    }
}

impl Emitter for Text {
    type Output = String;

    fn emit_one(&mut self, ctx: &Record) -> Result<String> {
        let n = self.numwords.emit_one(ctx)?;
        let words = self.collect_words(ctx, n)?;
        let mut seps = self
            .sep
            .emit_many(ctx, n.saturating_sub(1))?
            .into_iter();
        Ok(Self::assemble(&words, &mut seps))
    }

    fn emit_many(&mut self, ctx: &Record, count: usize) -> Result<Vec<String>> {
        let counts = self.numwords.emit_many(ctx, count)?;
        let total_words: usize = counts.iter().sum();
        let total_seps: usize = counts.iter().map(|n| n.saturating_sub(1)).sum();

        let all_words = self.collect_words(ctx, total_words)?;
        let mut seps = self.sep.emit_many(ctx, total_seps)?.into_iter();

        let mut texts = Vec::with_capacity(count);
        let mut offset = 0;
        for n in counts {
            let words = &all_words[offset..offset + n];
            offset += n;
            // A zero word count still contributes an output.
            texts.push(Self::assemble(words, &mut seps));
        }
        Ok(texts)
    }

    fn required_fields(&self) -> Vec<String> {
        let mut required = self.numwords.required_fields();
        for child in [self.word.required_fields(), self.sep.required_fields()] {
            for name in child {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        required
    }
}
