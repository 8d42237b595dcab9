//! # charsniff - Character Set Detection and Transcoding
//!
//! Detects the probable character encoding of raw bytes and converts text
//! between byte encodings and UTF-16 code units, for pipelines that ingest
//! documents of unknown or legacy encoding.
//!
//! ## Features
//!
//! - **Ranked detection** with bounded 0-100 confidence scores and a
//!   language hint for single-byte and CJK charsets
//! - **Swappable signature data** shared between detectors as `Arc<SignatureTable>`
//! - **Streaming transcoders** for Unicode, single-byte and CJK families
//! - **Strict or lenient** handling of malformed and unmappable input
//!
//! ## Quick Start
//!
//! ```rust
//! use charsniff::{CharsetConverter, CharsetDetector, DEFAULT_MAX_RESULTS};
//!
//! let bytes = "h\u{e9}llo".as_bytes();
//!
//! let mut detector = CharsetDetector::new().unwrap();
//! let guesses = detector.detect_all(bytes, DEFAULT_MAX_RESULTS).unwrap();
//! assert_eq!(guesses[0].charset, "UTF-8");
//!
//! let mut converter = CharsetConverter::new();
//! let units = converter.decode(guesses[0].charset, bytes).unwrap();
//! assert_eq!(String::from_utf16(&units).unwrap(), "h\u{e9}llo");
//! ```

#![deny(missing_docs)]

pub mod auto;
pub mod codec;
pub mod config;
pub mod detect;
mod encoding;
mod tables;

pub use codec::{CharsetConverter, ErrorMode};
pub use config::{Config, ConverterConfig, DetectorConfig};
pub use detect::{CharsetDetector, EncodingGuess, SignatureTable, SignatureTableBuilder};
pub use encoding::{Encoding, Family};

/// Result type for detection and conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Number of guesses returned when the caller has no preference
pub const DEFAULT_MAX_RESULTS: usize = 25;

/// Errors that can occur during detection and conversion
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The detector could not be initialized or could not analyze the input
    #[error("charset analysis failed: {0}")]
    AnalysisFailure(String),

    /// The encoding name is not registered
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Bytes that are not valid in the source encoding
    #[error("malformed {encoding} input at byte {position}")]
    MalformedInput {
        /// Canonical name of the source encoding
        encoding: &'static str,
        /// Byte offset of the first malformed byte
        position: usize,
    },

    /// A code point the target encoding cannot represent
    #[error("cannot encode U+{code_point:04X} as {encoding} at code unit {position}")]
    UnmappableCharacter {
        /// Canonical name of the target encoding
        encoding: &'static str,
        /// The offending code point, or the lone surrogate value
        code_point: u32,
        /// Code unit offset of the character in the input
        position: usize,
    },

    /// The caller's output slice cannot hold the result
    #[error("output buffer too small: {required} required, {capacity} available")]
    BufferTooSmall {
        /// Exact length needed for the complete result
        required: usize,
        /// Length of the slice that was provided
        capacity: usize,
    },

    /// The input exceeds the configured size cap
    #[error("input of {len} exceeds the configured limit of {limit}")]
    InputTooLarge {
        /// Length of the rejected input
        len: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Configuration could not be read or is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The input data itself could not be converted
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput { .. } | Error::UnmappableCharacter { .. }
        )
    }

    /// The request was wrong regardless of the data it carried
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedEncoding(_)
                | Error::BufferTooSmall { .. }
                | Error::InputTooLarge { .. }
                | Error::InvalidConfig(_)
        )
    }
}

/// Rank the likely encodings of `bytes` with a default detector.
///
/// Builds a one-shot [`CharsetDetector`] over the shared default
/// signature table. Keep a detector per worker instead when detecting in
/// a loop.
pub fn detect_all(bytes: &[u8], max_results: usize) -> Result<Vec<EncodingGuess>> {
    CharsetDetector::new()?.detect_all(bytes, max_results)
}

/// Decode `bytes` in the named encoding with a default converter
pub fn decode(encoding: &str, bytes: &[u8]) -> Result<Vec<u16>> {
    CharsetConverter::new().decode(encoding, bytes)
}

/// Encode UTF-16 `units` into the named encoding with a default converter
pub fn encode(encoding: &str, units: &[u16]) -> Result<Vec<u8>> {
    CharsetConverter::new().encode(encoding, units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let malformed = Error::MalformedInput {
            encoding: "UTF-8",
            position: 0,
        };
        assert!(malformed.is_data_error());
        assert!(!malformed.is_caller_error());

        let unsupported = Error::UnsupportedEncoding("x".into());
        assert!(unsupported.is_caller_error());
        assert!(!unsupported.is_data_error());

        let analysis = Error::AnalysisFailure("empty table".into());
        assert!(!analysis.is_caller_error());
        assert!(!analysis.is_data_error());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::UnmappableCharacter {
            encoding: "ISO-8859-1",
            code_point: 0x20AC,
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "cannot encode U+20AC as ISO-8859-1 at code unit 3"
        );
        let err = Error::BufferTooSmall {
            required: 10,
            capacity: 4,
        };
        assert_eq!(
            err.to_string(),
            "output buffer too small: 10 required, 4 available"
        );
    }

    #[test]
    fn test_one_shot_functions() {
        let units = decode("ISO-8859-1", &[0xE9]).unwrap();
        assert_eq!(units, vec![0x00E9]);
        assert_eq!(encode("ISO-8859-1", &units).unwrap(), vec![0xE9]);
        assert!(detect_all(&[], DEFAULT_MAX_RESULTS).unwrap().is_empty());
        assert!(matches!(
            decode("nonexistent-charset-xyz", b"abc"),
            Err(Error::UnsupportedEncoding(_))
        ));
    }
}
