//! Detect-then-decode policy.
//!
//! Detection looks at a sample, so the best guess may still fail on the
//! full input. [`decode_detected`] tries the guesses in ranked order and
//! settles on the first one that decodes.

use crate::codec::CharsetConverter;
use crate::detect::{CharsetDetector, EncodingGuess};
use crate::{DEFAULT_MAX_RESULTS, Result};

/// Text decoded with a detected charset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The guess that decoded successfully
    pub guess: EncodingGuess,
    /// UTF-16 code units of the text
    pub units: Vec<u16>,
}

impl Decoded {
    /// The text as a `String`, with lone surrogates replaced
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

/// Decode `bytes` with the most likely charset that accepts them.
///
/// Guesses whose decode fails on malformed data are skipped. Returns
/// `Ok(None)` when no guess decodes, including for empty input. Errors
/// other than malformed data are returned as they occur.
pub fn decode_detected(
    detector: &mut CharsetDetector,
    converter: &mut CharsetConverter,
    bytes: &[u8],
) -> Result<Option<Decoded>> {
    for guess in detector.detect_all(bytes, DEFAULT_MAX_RESULTS)? {
        match converter.decode(guess.charset, bytes) {
            Ok(units) => {
                tracing::debug!(charset = guess.charset, confidence = guess.confidence, "decoded with detected charset");
                return Ok(Some(Decoded { guess, units }));
            }
            Err(e) if e.is_data_error() => {
                tracing::debug!(charset = guess.charset, error = %e, "detected charset rejected input");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}
