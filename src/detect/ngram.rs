//! Character trigram language models for single-byte charsets.
//!
//! Text is normalized before trigrams are taken: letters are lowercased
//! and every run of non-letters collapses to one space, with a space at
//! both ends. A model keeps the most frequent trigrams of a reference
//! corpus. A sample scores by the share of its trigrams found in the
//! model, relative to the share the corpus itself reaches.

use std::collections::HashMap;

use crate::{Error, Result};

/// Trigrams kept per language
pub const MODEL_SIZE: usize = 128;

/// Samples with fewer trigrams than this score proportionally lower
const MIN_TRIGRAMS: usize = 16;

fn pack(a: char, b: char, c: char) -> u64 {
    (u64::from(a) << 42) | (u64::from(b) << 21) | u64::from(c)
}

/// Replace the contents of `out` with the packed trigrams of `text`
pub(crate) fn collect_trigrams(text: impl IntoIterator<Item = char>, out: &mut Vec<u64>) {
    struct Window<'a> {
        prev: [char; 2],
        seen: usize,
        out: &'a mut Vec<u64>,
    }

    impl Window<'_> {
        fn push(&mut self, c: char) {
            if self.seen >= 2 {
                self.out.push(pack(self.prev[0], self.prev[1], c));
            }
            self.prev = [self.prev[1], c];
            self.seen += 1;
        }
    }

    out.clear();
    let mut window = Window {
        prev: [' ', ' '],
        seen: 1,
        out,
    };
    for c in text {
        if c.is_alphabetic() {
            window.push(c.to_lowercase().next().unwrap_or(c));
        } else if window.prev[1] != ' ' {
            window.push(' ');
        }
    }
    if window.prev[1] != ' ' {
        window.push(' ');
    }
}

/// Frequent trigrams of one language
#[derive(Debug, Clone)]
pub struct LanguageModel {
    language: &'static str,
    trigrams: Vec<u64>,
    coverage: f64,
}

impl LanguageModel {
    /// Build a model from reference text in `language`
    pub fn from_corpus(language: &'static str, corpus: &str) -> Result<Self> {
        let mut all = Vec::new();
        collect_trigrams(corpus.chars(), &mut all);
        if all.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "corpus for language '{language}' contains no letters"
            )));
        }

        let mut counts: HashMap<u64, usize> = HashMap::new();
        for &trigram in &all {
            *counts.entry(trigram).or_default() += 1;
        }
        let mut ranked: Vec<(u64, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut trigrams: Vec<u64> = ranked
            .into_iter()
            .take(MODEL_SIZE)
            .map(|(trigram, _)| trigram)
            .collect();
        trigrams.sort_unstable();

        let hits = all
            .iter()
            .filter(|t| trigrams.binary_search(t).is_ok())
            .count();
        let coverage = hits as f64 / all.len() as f64;

        Ok(Self {
            language,
            trigrams,
            coverage,
        })
    }

    /// Language code reported with guesses scored by this model
    pub fn language(&self) -> &'static str {
        self.language
    }

    /// Score packed sample trigrams against this model
    pub(crate) fn confidence(&self, sample: &[u64]) -> u8 {
        if sample.is_empty() {
            return 0;
        }
        let hits = sample
            .iter()
            .filter(|t| self.trigrams.binary_search(t).is_ok())
            .count();
        let ratio = hits as f64 / sample.len() as f64;
        let mut confidence = ((ratio * 150.0 / self.coverage) as u32).min(100);
        if sample.len() < MIN_TRIGRAMS {
            confidence = confidence * sample.len() as u32 / MIN_TRIGRAMS as u32;
        }
        confidence as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigrams(text: &str) -> Vec<u64> {
        let mut out = Vec::new();
        collect_trigrams(text.chars(), &mut out);
        out
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            trigrams("Ab, c"),
            vec![pack(' ', 'a', 'b'), pack('a', 'b', ' '), pack('b', ' ', 'c'), pack(' ', 'c', ' ')]
        );
        assert_eq!(trigrams("  !! 42 "), Vec::<u64>::new());
        assert_eq!(trigrams("x"), vec![pack(' ', 'x', ' ')]);
    }

    #[test]
    fn test_reuses_buffer() {
        let mut out = vec![1, 2, 3];
        collect_trigrams("ab".chars(), &mut out);
        assert_eq!(out, vec![pack(' ', 'a', 'b'), pack('a', 'b', ' ')]);
    }

    #[test]
    fn test_model_keeps_most_frequent() {
        let model = LanguageModel::from_corpus("xx", "the the the cat").unwrap();
        assert_eq!(model.language(), "xx");
        assert!(model.trigrams.binary_search(&pack(' ', 't', 'h')).is_ok());
        assert!(model.trigrams.windows(2).all(|w| w[0] < w[1]));
        assert!((model.coverage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_model_size_is_bounded() {
        let corpus = include_str!("../../data/lang/en.txt");
        let model = LanguageModel::from_corpus("en", corpus).unwrap();
        assert_eq!(model.trigrams.len(), MODEL_SIZE);
        assert!(model.coverage > 0.0 && model.coverage < 1.0);
    }

    #[test]
    fn test_confidence() {
        let model = LanguageModel::from_corpus("en", include_str!("../../data/lang/en.txt")).unwrap();
        let english = trigrams(
            "This is a short note about the weather. It rained all night and the river \
             is higher than it was last week, so the farmers are worried about their fields.",
        );
        assert_eq!(model.confidence(&english), 100);
        assert_eq!(model.confidence(&[]), 0);
        assert_eq!(model.confidence(&trigrams("zzqx vvkj")), 0);
    }

    #[test]
    fn test_short_samples_are_damped() {
        let model = LanguageModel::from_corpus("xx", "the the the cat").unwrap();
        // Every trigram of " the " is in the model, but there are only three
        assert_eq!(model.confidence(&trigrams("the")), (100u32 * 3 / 16) as u8);
    }

    #[test]
    fn test_corpus_without_letters() {
        assert!(matches!(
            LanguageModel::from_corpus("xx", "1234 !?"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
