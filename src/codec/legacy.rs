//! CJK transcoders backed by `encoding_rs`.
//!
//! `encoding_rs` decoders and encoders are stateful, so chunks are fed to
//! one instance per request. Output goes through the converter's scratch
//! buffer. Lone surrogates are rejected before they reach the encoder,
//! which would otherwise turn them into U+FFFD, a character GB18030 can
//! represent.

use encoding_rs::{DecoderResult, EncoderResult};

use super::{Decoder, Encoder, ErrorMode, Sink, complete_prefix, malformed, scalars};
use crate::{Encoding, Error, Result};

fn codec(encoding: Encoding) -> Result<&'static encoding_rs::Encoding> {
    encoding
        .legacy_codec()
        .ok_or_else(|| Error::UnsupportedEncoding(encoding.name().to_string()))
}

pub(super) struct LegacyDecoder<'a> {
    encoding: Encoding,
    inner: encoding_rs::Decoder,
    mode: ErrorMode,
    scratch: &'a mut [u16],
}

impl<'a> LegacyDecoder<'a> {
    pub(super) fn new(encoding: Encoding, mode: ErrorMode, scratch: &'a mut [u16]) -> Result<Self> {
        Ok(Self {
            encoding,
            inner: codec(encoding)?.new_decoder_without_bom_handling(),
            mode,
            scratch,
        })
    }
}

impl Decoder for LegacyDecoder<'_> {
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize> {
        let mut read_total = 0;
        loop {
            let (result, read, written) = self.inner.decode_to_utf16_without_replacement(
                &input[read_total..],
                &mut self.scratch[..],
                last,
            );
            read_total += read;
            out.extend_from_slice(&self.scratch[..written]);

            match result {
                DecoderResult::InputEmpty => return Ok(input.len()),
                DecoderResult::OutputFull => {}
                DecoderResult::Malformed(bad, consumed_after) => {
                    // The malformed bytes may have started in an earlier chunk.
                    let position = (offset + read_total)
                        .saturating_sub(bad as usize + consumed_after as usize);
                    malformed(self.mode, self.encoding, position, out)?;
                }
            }
        }
    }
}

pub(super) struct LegacyEncoder<'a> {
    encoding: Encoding,
    inner: encoding_rs::Encoder,
    mode: ErrorMode,
    substitution: char,
    scratch: &'a mut [u8],
}

impl<'a> LegacyEncoder<'a> {
    pub(super) fn new(
        encoding: Encoding,
        mode: ErrorMode,
        substitution: char,
        scratch: &'a mut [u8],
    ) -> Result<Self> {
        Ok(Self {
            encoding,
            inner: codec(encoding)?.new_encoder(),
            mode,
            substitution,
            scratch,
        })
    }

    /// Encode a run free of lone surrogates
    fn encode_run(
        &mut self,
        input: &[u16],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u8>,
    ) -> Result<()> {
        let mut read_total = 0;
        loop {
            let (result, read, written) = self.inner.encode_from_utf16_without_replacement(
                &input[read_total..],
                &mut self.scratch[..],
                last,
            );
            read_total += read;
            out.extend_from_slice(&self.scratch[..written]);

            match result {
                EncoderResult::InputEmpty => return Ok(()),
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(c) => {
                    let position = offset + read_total - c.len_utf16();
                    self.reject(c as u32, position, out)?;
                }
            }
        }
    }

    fn reject(&mut self, code_point: u32, position: usize, out: &mut dyn Sink<u8>) -> Result<()> {
        let error = Error::UnmappableCharacter {
            encoding: self.encoding.name(),
            code_point,
            position,
        };
        if self.mode == ErrorMode::Strict {
            return Err(error);
        }

        let mut units = [0u16; 2];
        let substitution = self.substitution.encode_utf16(&mut units);
        let (result, _, written) =
            self.inner
                .encode_from_utf16_without_replacement(substitution, &mut self.scratch[..], false);
        match result {
            EncoderResult::InputEmpty => {
                out.extend_from_slice(&self.scratch[..written]);
                Ok(())
            }
            _ => Err(error),
        }
    }
}

impl Encoder for LegacyEncoder<'_> {
    fn encode(
        &mut self,
        input: &[u16],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u8>,
    ) -> Result<usize> {
        let len = complete_prefix(input, last);
        let mut start = 0;
        loop {
            let lone = scalars(&input[start..len])
                .find(|(_, scalar)| scalar.is_err())
                .map(|(at, _)| start + at);
            let end = lone.unwrap_or(len);
            self.encode_run(&input[start..end], offset + start, last && lone.is_none(), out)?;

            match lone {
                None => return Ok(len),
                Some(at) => {
                    self.reject(input[at] as u32, offset + at, out)?;
                    start = at + 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{CharsetConverter, ErrorMode, REPLACEMENT};
    use crate::Error;

    fn utf16(text: &str) -> Vec<u16> {
        text.encode_utf16().collect()
    }

    #[test]
    fn test_known_vectors() {
        let mut converter = CharsetConverter::new();
        let sjis = [72, 101, 108, 108, 111, 32, 144, 162, 138, 69];
        let big5 = [72, 101, 108, 108, 111, 32, 165, 64, 172, 201];
        assert_eq!(converter.decode("Shift_JIS", &sjis).unwrap(), utf16("Hello 世界"));
        assert_eq!(converter.decode("Big5", &big5).unwrap(), utf16("Hello 世界"));
        assert_eq!(converter.encode("sjis", &utf16("Hello 世界")).unwrap(), sjis);
        assert_eq!(converter.encode("big5", &utf16("Hello 世界")).unwrap(), big5);
    }

    #[test]
    fn test_iso_2022_jp_returns_to_ascii() {
        let mut converter = CharsetConverter::new();
        let bytes = converter.encode("ISO-2022-JP", &utf16("a日b日")).unwrap();
        assert_eq!(&bytes[..4], b"a\x1b$B");
        assert!(bytes.ends_with(b"\x1b(B"));
        assert_eq!(converter.decode("ISO-2022-JP", &bytes).unwrap(), utf16("a日b日"));
    }

    #[test]
    fn test_malformed_position() {
        let mut converter = CharsetConverter::new();
        // 0x82 0x20 is not a Shift_JIS character
        assert_eq!(
            converter.decode("Shift_JIS", b"abc\x82\x20def"),
            Err(Error::MalformedInput { encoding: "Shift_JIS", position: 3 })
        );
        converter.set_error_mode(ErrorMode::Lenient);
        let units = converter.decode("EUC-KR", b"ok\xFF").unwrap();
        assert_eq!(units, vec![0x6F, 0x6B, REPLACEMENT]);
    }

    #[test]
    fn test_unmappable_position() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.encode("EUC-KR", &utf16("가나🌍")),
            Err(Error::UnmappableCharacter { encoding: "EUC-KR", code_point: 0x1F30D, position: 2 })
        );
        converter.set_error_mode(ErrorMode::Lenient);
        let bytes = converter.encode("Shift_JIS", &utf16("日€本")).unwrap();
        assert_eq!(converter.decode("Shift_JIS", &bytes).unwrap(), utf16("日?本"));
    }

    #[test]
    fn test_lone_surrogate_rejected_by_gb18030() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.encode("GB18030", &[0x41, 0xDC00, 0x42]),
            Err(Error::UnmappableCharacter { encoding: "GB18030", code_point: 0xDC00, position: 1 })
        );
        converter.set_error_mode(ErrorMode::Lenient);
        assert_eq!(converter.encode("GB18030", &[0x41, 0xDC00, 0x42]).unwrap(), b"A?B");
    }

    #[test]
    fn test_gbk_and_gb18030() {
        let mut converter = CharsetConverter::new();
        let text = utf16("中文字符");
        let gbk = converter.encode("GBK", &text).unwrap();
        assert_eq!(gbk.len(), 8);
        assert_eq!(converter.decode("GB18030", &gbk).unwrap(), text);
        // Outside GBK, representable in GB18030 with four bytes
        assert!(converter.encode("GBK", &utf16("🌍")).is_err());
        assert_eq!(converter.encode("GB18030", &utf16("🌍")).unwrap().len(), 4);
    }
}
