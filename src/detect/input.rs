//! Per-call view of the bytes under analysis.

use crate::config::DetectorConfig;

/// Sample and markup filter state for one detection call.
///
/// Owned by a detector and reset by every [`InputText::prepare`], so nothing
/// from a previous call is visible to the recognizers.
#[derive(Debug)]
pub(crate) struct InputText {
    bytes: Vec<u8>,
    has_c1: bool,
}

impl InputText {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::new(),
            has_c1: false,
        }
    }

    /// Load `raw` for analysis, truncated to the sample length and optionally stripped of markup
    pub(crate) fn prepare(&mut self, raw: &[u8], config: &DetectorConfig) {
        let sample = &raw[..raw.len().min(config.max_sample_len)];

        self.bytes.clear();
        if !(config.strip_markup && self.strip_markup(sample)) {
            self.bytes.extend_from_slice(sample);
        }

        self.has_c1 = self.bytes.iter().any(|byte| (0x80..0xA0).contains(byte));
    }

    /// Copy `sample` without `<...>` runs, and report whether the result is
    /// worth analyzing instead of the raw bytes.
    fn strip_markup(&mut self, sample: &[u8]) -> bool {
        let mut in_markup = false;
        let mut open_tags = 0usize;
        let mut bad_tags = 0usize;

        for &byte in sample {
            if byte == b'<' {
                if in_markup {
                    bad_tags += 1;
                }
                in_markup = true;
                open_tags += 1;
            }
            if !in_markup {
                self.bytes.push(byte);
            }
            if byte == b'>' {
                in_markup = false;
            }
        }

        // Not markup after all, or markup with almost no text in it
        if open_tags < 5
            || open_tags / 5 < bad_tags
            || (self.bytes.len() < 100 && sample.len() > 600)
            || self.bytes.is_empty()
        {
            self.bytes.clear();
            return false;
        }
        true
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether any byte in 0x80..=0x9F occurs
    pub(crate) fn has_c1(&self) -> bool {
        self.has_c1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(raw: &[u8], config: &DetectorConfig) -> InputText {
        let mut input = InputText::new();
        input.prepare(raw, config);
        input
    }

    #[test]
    fn test_truncates_to_sample_length() {
        let config = DetectorConfig {
            max_sample_len: 4,
            ..DetectorConfig::default()
        };
        let input = prepared(b"abcdefgh", &config);
        assert_eq!(input.bytes(), b"abcd");
    }

    #[test]
    fn test_c1_presence() {
        let config = DetectorConfig::default();
        assert!(prepared(b"a\x93b", &config).has_c1());
        assert!(!prepared(b"a\xE9b", &config).has_c1());
        // Only the sample counts
        let short = DetectorConfig {
            max_sample_len: 2,
            ..DetectorConfig::default()
        };
        assert!(!prepared(b"ab\x93", &short).has_c1());
    }

    #[test]
    fn test_state_is_reset_between_calls() {
        let config = DetectorConfig::default();
        let mut input = InputText::new();
        input.prepare(b"\x85\x85", &config);
        assert!(input.has_c1());
        input.prepare(b"plain", &config);
        assert!(!input.has_c1());
        assert_eq!(input.bytes(), b"plain");
    }

    #[test]
    fn test_strips_markup() {
        let config = DetectorConfig {
            strip_markup: true,
            ..DetectorConfig::default()
        };
        let html = b"<html><head><title>T</title></head><body><p>caf\xE9 au lait</p></body></html>";
        let input = prepared(html, &config);
        assert_eq!(input.bytes(), b"Tcaf\xE9 au lait");
    }

    #[test]
    fn test_keeps_raw_bytes_without_enough_markup() {
        let config = DetectorConfig {
            strip_markup: true,
            ..DetectorConfig::default()
        };
        let text = b"a < b and c > d";
        assert_eq!(prepared(text, &config).bytes(), text);
    }
}
