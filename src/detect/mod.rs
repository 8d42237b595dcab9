//! Charset detection.
//!
//! A [`CharsetDetector`] runs every recognizer of its [`SignatureTable`]
//! over a sample of the input and returns the candidates ranked by
//! confidence. Detectors own their scratch buffers, so keep one per
//! worker and share the table.

mod input;
mod iso2022;
mod mbcs;
mod ngram;
mod sbcs;
mod signature;
mod unicode;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::DetectorConfig;
use crate::{Encoding, Error, Result};
use input::InputText;
pub use signature::{SignatureTable, SignatureTableBuilder};

/// A candidate charset for some input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EncodingGuess {
    /// Canonical charset name, accepted by [`crate::CharsetConverter`]
    pub charset: &'static str,
    /// ISO 639-1 language code, empty when the recognizer has no language
    pub language: &'static str,
    /// 0 to 100, higher is more likely
    pub confidence: u8,
}

impl EncodingGuess {
    /// The registered encoding named by this guess
    pub fn encoding(&self) -> Option<Encoding> {
        Encoding::for_name(self.charset)
    }

    /// Ranking order: confidence descending, then charset and language ascending
    fn rank(&self, other: &Self) -> Ordering {
        other
            .confidence
            .cmp(&self.confidence)
            .then_with(|| self.charset.cmp(other.charset))
            .then_with(|| self.language.cmp(other.language))
    }
}

impl fmt::Display for EncodingGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.language.is_empty() {
            write!(f, "{} ({})", self.charset, self.confidence)
        } else {
            write!(f, "{} [{}] ({})", self.charset, self.language, self.confidence)
        }
    }
}

/// Ranks the likely charsets of byte input
#[derive(Debug)]
pub struct CharsetDetector {
    table: Arc<SignatureTable>,
    config: DetectorConfig,
    input: InputText,
    trigrams: Vec<u64>,
}

impl CharsetDetector {
    /// Detector over the shared default table with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DetectorConfig::default())
    }

    /// Detector over the shared default table.
    ///
    /// `enabled_charsets` in the configuration restricts the table; every
    /// name must be one the default table can detect.
    pub fn with_config(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let mut table = SignatureTable::shared()?;
        if let Some(names) = &config.enabled_charsets {
            table = Arc::new(table.restricted(names)?);
        }
        Self::with_table(table, config)
    }

    /// Detector over a caller-built table, used as is
    pub fn with_table(table: Arc<SignatureTable>, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        if table.is_empty() {
            return Err(Error::AnalysisFailure(
                "signature table has no charsets".into(),
            ));
        }
        Ok(Self {
            table,
            config,
            input: InputText::new(),
            trigrams: Vec::new(),
        })
    }

    /// The signature table this detector reads
    pub fn table(&self) -> &Arc<SignatureTable> {
        &self.table
    }

    /// Current settings
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Turn markup stripping on or off for later calls
    pub fn set_strip_markup(&mut self, strip: bool) {
        self.config.strip_markup = strip;
    }

    /// Rank up to `max_results` candidate charsets for `bytes`.
    ///
    /// Guesses are ordered by confidence, highest first, with ties broken
    /// by charset name and then language. Each charset appears at most
    /// once, and guesses below the configured minimum confidence (never
    /// below 1) are left out. Empty input or `max_results == 0` yields an
    /// empty list.
    pub fn detect_all(&mut self, bytes: &[u8], max_results: usize) -> Result<Vec<EncodingGuess>> {
        if bytes.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }
        if let Some(limit) = self.config.max_input_len {
            if bytes.len() > limit {
                return Err(Error::AnalysisFailure(format!(
                    "input of {} bytes exceeds the analysis limit of {limit}",
                    bytes.len()
                )));
            }
        }

        self.input.prepare(bytes, &self.config);
        let min_confidence = self.config.min_confidence.max(1);

        let mut guesses = Vec::with_capacity(self.table.len());
        for signature in self.table.signatures() {
            let Some(guess) = signature.recognize(&self.input, &mut self.trigrams) else {
                continue;
            };
            tracing::trace!(
                charset = guess.charset,
                language = guess.language,
                confidence = guess.confidence,
                "recognizer score"
            );
            if guess.confidence >= min_confidence {
                guesses.push(guess);
            }
        }

        guesses.sort_by(EncodingGuess::rank);
        let mut seen = HashSet::new();
        guesses.retain(|guess| seen.insert(guess.charset));
        guesses.truncate(max_results);

        tracing::debug!(
            len = bytes.len(),
            candidates = guesses.len(),
            best = guesses.first().map(|g| g.charset),
            "detected charsets"
        );
        Ok(guesses)
    }

    /// The single most likely charset, if any
    pub fn detect(&mut self, bytes: &[u8]) -> Result<Option<EncodingGuess>> {
        Ok(self.detect_all(bytes, 1)?.into_iter().next())
    }
}
