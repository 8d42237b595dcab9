//! Table-driven transcoders for one-byte-per-character encodings.

use super::{Decoder, Encoder, ErrorMode, Sink, encode_scalars, malformed};
use crate::tables::CodePage;
use crate::{Encoding, Result};

pub(super) struct SingleByteDecoder {
    encoding: Encoding,
    page: &'static CodePage,
    mode: ErrorMode,
}

impl SingleByteDecoder {
    pub(super) fn new(encoding: Encoding, page: &'static CodePage, mode: ErrorMode) -> Self {
        Self {
            encoding,
            page,
            mode,
        }
    }
}

impl Decoder for SingleByteDecoder {
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        _last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize> {
        for (pos, &byte) in input.iter().enumerate() {
            match self.page.decode(byte) {
                Some(unit) => out.push(unit),
                None => malformed(self.mode, self.encoding, offset + pos, out)?,
            }
        }
        Ok(input.len())
    }
}

pub(super) struct SingleByteEncoder {
    encoding: Encoding,
    page: &'static CodePage,
    mode: ErrorMode,
    substitution: char,
}

impl SingleByteEncoder {
    pub(super) fn new(
        encoding: Encoding,
        page: &'static CodePage,
        mode: ErrorMode,
        substitution: char,
    ) -> Self {
        Self {
            encoding,
            page,
            mode,
            substitution,
        }
    }
}

impl Encoder for SingleByteEncoder {
    fn encode(
        &mut self,
        input: &[u16],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u8>,
    ) -> Result<usize> {
        let page = self.page;
        encode_scalars(
            input,
            offset,
            last,
            self.encoding,
            self.mode,
            self.substitution,
            out,
            |c, out| {
                let byte = u16::try_from(u32::from(c))
                    .ok()
                    .and_then(|unit| page.encode(unit));
                match byte {
                    Some(byte) => {
                        out.push(byte);
                        true
                    }
                    None => false,
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::{CharsetConverter, ErrorMode, REPLACEMENT};
    use crate::{ConverterConfig, Error};

    #[test]
    fn test_ebcdic_to_utf16() {
        let mut converter = CharsetConverter::new();
        // "HELLO" in EBCDIC
        let units = converter.decode("IBM037", &[0xC8, 0xC5, 0xD3, 0xD3, 0xD6]).unwrap();
        assert_eq!(String::from_utf16(&units).unwrap(), "HELLO");
    }

    #[test]
    fn test_windows_1252_punctuation() {
        let mut converter = CharsetConverter::new();
        let units = converter.decode("windows-1252", b"Hello\x99\x80").unwrap();
        assert_eq!(String::from_utf16(&units).unwrap(), "Hello™€");
        assert_eq!(converter.encode("cp1252", &units).unwrap(), b"Hello\x99\x80");
    }

    #[test]
    fn test_unmapped_byte_is_malformed() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.decode("US-ASCII", b"ok\x80"),
            Err(Error::MalformedInput { encoding: "US-ASCII", position: 2 })
        );
        converter.set_error_mode(ErrorMode::Lenient);
        assert_eq!(converter.decode("ascii", b"ok\x80").unwrap(), vec![0x6F, 0x6B, REPLACEMENT]);
    }

    #[test]
    fn test_unmappable_character() {
        let mut converter = CharsetConverter::new();
        let units: Vec<u16> = "naïve €".encode_utf16().collect();
        assert_eq!(
            converter.encode("ISO-8859-1", &units),
            Err(Error::UnmappableCharacter { encoding: "ISO-8859-1", code_point: 0x20AC, position: 6 })
        );
        let astral: Vec<u16> = "a🌍".encode_utf16().collect();
        assert_eq!(
            converter.encode("KOI8-R", &astral),
            Err(Error::UnmappableCharacter { encoding: "KOI8-R", code_point: 0x1F30D, position: 1 })
        );
    }

    #[test]
    fn test_custom_substitution() {
        let mut converter = CharsetConverter::with_config(ConverterConfig {
            error_mode: ErrorMode::Lenient,
            substitution: '*',
            ..ConverterConfig::default()
        })
        .unwrap();
        let units: Vec<u16> = "€1".encode_utf16().collect();
        assert_eq!(converter.encode("ISO-8859-1", &units).unwrap(), b"*1");
        // '?' in EBCDIC is 0x6F
        let mut ebcdic = CharsetConverter::new();
        ebcdic.set_error_mode(ErrorMode::Lenient);
        assert_eq!(ebcdic.encode("IBM037", &units).unwrap(), vec![0x6F, 0xF1]);
    }

    #[test]
    fn test_substitution_without_representation_fails() {
        let mut converter = CharsetConverter::with_config(ConverterConfig {
            error_mode: ErrorMode::Lenient,
            substitution: '€',
            ..ConverterConfig::default()
        })
        .unwrap();
        let units: Vec<u16> = "Ω".encode_utf16().collect();
        assert!(matches!(
            converter.encode("ISO-8859-1", &units),
            Err(Error::UnmappableCharacter { code_point: 0x3A9, .. })
        ));
    }

    #[test]
    fn test_every_latin1_byte_round_trips() {
        let mut converter = CharsetConverter::new();
        let bytes: Vec<u8> = (0..=255).collect();
        let units = converter.decode("ISO-8859-1", &bytes).unwrap();
        assert_eq!(units.len(), 256);
        assert_eq!(converter.encode("ISO-8859-1", &units).unwrap(), bytes);
    }
}
