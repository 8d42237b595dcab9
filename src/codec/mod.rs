//! Conversion between byte encodings and UTF-16 code units.
//!
//! A [`CharsetConverter`] resolves an encoding name, picks the transcoder of
//! the encoding's [`Family`], and streams the input through it in chunks of
//! `chunk_len`. Transcoders carry incomplete sequences across chunk
//! boundaries, so a chunked conversion equals a whole-buffer one.

mod legacy;
mod single_byte;
mod unicode;

use serde::{Deserialize, Serialize};

use crate::config::ConverterConfig;
use crate::{Encoding, Error, Family, Result, tables};

/// U+FFFD, written for malformed input in lenient mode
pub(crate) const REPLACEMENT: u16 = 0xFFFD;

/// Scratch length for the legacy transcoders' intermediate output
const SCRATCH_LEN: usize = 1024;

/// What to do with malformed or unmappable input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Stop at the first problem and report its position
    #[default]
    Strict,
    /// Substitute U+FFFD when decoding and the configured character when encoding
    Lenient,
}

/// Destination for transcoded output
pub(crate) trait Sink<T> {
    fn push(&mut self, item: T);
    fn extend_from_slice(&mut self, items: &[T]);
}

impl<T: Copy> Sink<T> for Vec<T> {
    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }

    fn extend_from_slice(&mut self, items: &[T]) {
        Vec::extend_from_slice(self, items);
    }
}

/// Counts output without storing it
#[derive(Debug, Default)]
pub(crate) struct Counter(pub(crate) usize);

impl<T> Sink<T> for Counter {
    fn push(&mut self, _item: T) {
        self.0 += 1;
    }

    fn extend_from_slice(&mut self, items: &[T]) {
        self.0 += items.len();
    }
}

/// Byte to code unit transcoder for one request
pub(crate) trait Decoder {
    /// Decode a prefix of `input`, which starts at byte `offset` of the
    /// request, and return how many bytes were consumed.
    ///
    /// Unconsumed bytes form an incomplete sequence and are presented again
    /// together with the next chunk. When `last` is set all input must be
    /// consumed.
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize>;
}

/// Code unit to byte transcoder for one request, same contract as [`Decoder`]
pub(crate) trait Encoder {
    fn encode(
        &mut self,
        input: &[u16],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u8>,
    ) -> Result<usize>;
}

/// Feed `input` to `step` in chunks, carrying unconsumed tails forward
fn pump<T: Copy>(
    input: &[T],
    chunk_len: usize,
    mut step: impl FnMut(&[T], usize, bool) -> Result<usize>,
) -> Result<()> {
    if input.is_empty() {
        step(&[], 0, true)?;
        return Ok(());
    }

    let mut carry: Vec<T> = Vec::new();
    let mut offset = 0;
    let mut chunks = input.chunks(chunk_len).peekable();

    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        let consumed = if carry.is_empty() {
            let consumed = step(chunk, offset, last)?;
            carry.extend_from_slice(&chunk[consumed..]);
            consumed
        } else {
            carry.extend_from_slice(chunk);
            let pending = std::mem::take(&mut carry);
            let consumed = step(&pending, offset, last)?;
            carry.extend_from_slice(&pending[consumed..]);
            consumed
        };
        offset += consumed;
    }

    debug_assert!(carry.is_empty(), "transcoder left input unconsumed");
    Ok(())
}

/// Report or replace a malformed sequence
pub(crate) fn malformed(
    mode: ErrorMode,
    encoding: Encoding,
    position: usize,
    out: &mut dyn Sink<u16>,
) -> Result<()> {
    match mode {
        ErrorMode::Strict => Err(Error::MalformedInput {
            encoding: encoding.name(),
            position,
        }),
        ErrorMode::Lenient => {
            out.push(REPLACEMENT);
            Ok(())
        }
    }
}

/// Scalar values of `input` with their code unit offsets.
///
/// Unpaired surrogates come back as `Err(unit)`.
pub(crate) fn scalars(
    input: &[u16],
) -> impl Iterator<Item = (usize, std::result::Result<char, u16>)> + '_ {
    let mut position = 0;
    char::decode_utf16(input.iter().copied()).map(move |item| {
        let at = position;
        match item {
            Ok(c) => {
                position += c.len_utf16();
                (at, Ok(c))
            }
            Err(e) => {
                position += 1;
                (at, Err(e.unpaired_surrogate()))
            }
        }
    })
}

/// Length of the prefix of `input` that can be encoded now.
///
/// A trailing high surrogate waits for its partner unless this is the last chunk.
pub(crate) fn complete_prefix(input: &[u16], last: bool) -> usize {
    match input.last() {
        Some(&unit) if !last && (0xD800..=0xDBFF).contains(&unit) => input.len() - 1,
        _ => input.len(),
    }
}

/// Encode `input` one scalar at a time with `write`, which returns `false`
/// without writing anything when the scalar has no representation.
pub(crate) fn encode_scalars(
    input: &[u16],
    offset: usize,
    last: bool,
    target: Encoding,
    mode: ErrorMode,
    substitution: char,
    out: &mut dyn Sink<u8>,
    mut write: impl FnMut(char, &mut dyn Sink<u8>) -> bool,
) -> Result<usize> {
    let len = complete_prefix(input, last);
    for (at, scalar) in scalars(&input[..len]) {
        let written = match scalar {
            Ok(c) => write(c, &mut *out),
            Err(_) => false,
        };
        if written {
            continue;
        }
        let code_point = match scalar {
            Ok(c) => c as u32,
            Err(unit) => unit as u32,
        };
        let error = Error::UnmappableCharacter {
            encoding: target.name(),
            code_point,
            position: offset + at,
        };
        if mode == ErrorMode::Strict || !write(substitution, &mut *out) {
            return Err(error);
        }
    }
    Ok(len)
}

/// Owned conversion handle with per-instance scratch buffers.
///
/// Calls take `&mut self`, so one instance serves one caller at a time;
/// keep one converter per worker thread.
#[derive(Debug)]
pub struct CharsetConverter {
    config: ConverterConfig,
    unit_scratch: Vec<u16>,
    byte_scratch: Vec<u8>,
}

impl Default for CharsetConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharsetConverter {
    /// Create a strict converter with default settings
    pub fn new() -> Self {
        Self {
            config: ConverterConfig::default(),
            unit_scratch: vec![0; SCRATCH_LEN],
            byte_scratch: vec![0; SCRATCH_LEN],
        }
    }

    /// Create a converter from validated settings
    pub fn with_config(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Current settings
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Switch between strict and lenient handling
    pub fn set_error_mode(&mut self, mode: ErrorMode) {
        self.config.error_mode = mode;
    }

    /// Decode `bytes` in the named encoding into UTF-16 code units
    pub fn decode(&mut self, encoding: &str, bytes: &[u8]) -> Result<Vec<u16>> {
        let encoding = encoding.parse()?;
        self.decode_with(encoding, bytes)
    }

    /// Decode `bytes` in an already resolved encoding
    pub fn decode_with(&mut self, encoding: Encoding, bytes: &[u8]) -> Result<Vec<u16>> {
        let mut units = Vec::with_capacity(bytes.len());
        self.run_decode(encoding, bytes, &mut units)?;
        tracing::debug!(
            encoding = encoding.name(),
            bytes = bytes.len(),
            units = units.len(),
            "decoded"
        );
        Ok(units)
    }

    /// Number of code units [`decode`](Self::decode) would produce
    pub fn decoded_len(&mut self, encoding: &str, bytes: &[u8]) -> Result<usize> {
        let encoding = encoding.parse()?;
        let mut counter = Counter::default();
        self.run_decode(encoding, bytes, &mut counter)?;
        Ok(counter.0)
    }

    /// Decode into a caller-provided slice and return the number of units written.
    ///
    /// Fails with [`Error::BufferTooSmall`] carrying the exact required
    /// length when `out` is too short; `out` is left untouched in that case.
    pub fn decode_into(&mut self, encoding: &str, bytes: &[u8], out: &mut [u16]) -> Result<usize> {
        let units = self.decode(encoding, bytes)?;
        fill(&units, out)
    }

    /// Encode UTF-16 code units into the named encoding
    pub fn encode(&mut self, encoding: &str, units: &[u16]) -> Result<Vec<u8>> {
        let encoding = encoding.parse()?;
        self.encode_with(encoding, units)
    }

    /// Encode into an already resolved encoding
    pub fn encode_with(&mut self, encoding: Encoding, units: &[u16]) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(units.len());
        self.run_encode(encoding, units, &mut bytes)?;
        tracing::debug!(
            encoding = encoding.name(),
            units = units.len(),
            bytes = bytes.len(),
            "encoded"
        );
        Ok(bytes)
    }

    /// Number of bytes [`encode`](Self::encode) would produce
    pub fn encoded_len(&mut self, encoding: &str, units: &[u16]) -> Result<usize> {
        let encoding = encoding.parse()?;
        let mut counter = Counter::default();
        self.run_encode(encoding, units, &mut counter)?;
        Ok(counter.0)
    }

    /// Encode into a caller-provided slice, mirror of [`decode_into`](Self::decode_into)
    pub fn encode_into(&mut self, encoding: &str, units: &[u16], out: &mut [u8]) -> Result<usize> {
        let bytes = self.encode(encoding, units)?;
        fill(&bytes, out)
    }

    /// Decode `bytes` straight to a `String`
    pub fn to_utf8(&mut self, encoding: &str, bytes: &[u8]) -> Result<String> {
        let units = self.decode(encoding, bytes)?;
        Ok(String::from_utf16_lossy(&units))
    }

    /// Convert bytes from one named encoding to another
    pub fn transcode(&mut self, from: &str, to: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        let target: Encoding = to.parse()?;
        let units = self.decode(from, bytes)?;
        self.encode_with(target, &units)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        match self.config.max_input_len {
            Some(limit) if len > limit => Err(Error::InputTooLarge { len, limit }),
            _ => Ok(()),
        }
    }

    fn run_decode(&mut self, encoding: Encoding, bytes: &[u8], out: &mut dyn Sink<u16>) -> Result<()> {
        self.check_len(bytes.len())?;
        let mode = self.config.error_mode;

        let mut decoder: Box<dyn Decoder + '_> = match encoding.family() {
            Family::Unicode => unicode::decoder(encoding, mode),
            Family::SingleByte => {
                let page = tables::code_page(encoding)
                    .ok_or_else(|| Error::UnsupportedEncoding(encoding.name().to_string()))?;
                Box::new(single_byte::SingleByteDecoder::new(encoding, page, mode))
            }
            Family::MultiByte => Box::new(legacy::LegacyDecoder::new(
                encoding,
                mode,
                &mut self.unit_scratch,
            )?),
        };

        pump(bytes, self.config.chunk_len, |chunk, offset, last| {
            decoder.decode(chunk, offset, last, &mut *out)
        })
    }

    fn run_encode(&mut self, encoding: Encoding, units: &[u16], out: &mut dyn Sink<u8>) -> Result<()> {
        self.check_len(units.len())?;
        let mode = self.config.error_mode;
        let substitution = self.config.substitution;

        let mut encoder: Box<dyn Encoder + '_> = match encoding.family() {
            Family::Unicode => unicode::encoder(encoding, mode, substitution),
            Family::SingleByte => {
                let page = tables::code_page(encoding)
                    .ok_or_else(|| Error::UnsupportedEncoding(encoding.name().to_string()))?;
                Box::new(single_byte::SingleByteEncoder::new(
                    encoding,
                    page,
                    mode,
                    substitution,
                ))
            }
            Family::MultiByte => Box::new(legacy::LegacyEncoder::new(
                encoding,
                mode,
                substitution,
                &mut self.byte_scratch,
            )?),
        };

        pump(units, self.config.chunk_len, |chunk, offset, last| {
            encoder.encode(chunk, offset, last, &mut *out)
        })
    }
}

fn fill<T: Copy>(result: &[T], out: &mut [T]) -> Result<usize> {
    if result.len() > out.len() {
        return Err(Error::BufferTooSmall {
            required: result.len(),
            capacity: out.len(),
        });
    }
    out[..result.len()].copy_from_slice(result);
    Ok(result.len())
}
