//! UTF-8, UTF-16 and UTF-32 transcoders.
//!
//! The explicit-endian forms keep a leading U+FEFF as ordinary text. The
//! byte-order-neutral `UTF-16` and `UTF-32` consume a BOM when decoding
//! (big endian without one) and write a big endian BOM when encoding.

use super::{Decoder, Encoder, ErrorMode, Sink, encode_scalars, malformed};
use crate::{Encoding, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        }
    }

    fn write_u16(self, unit: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => unit.to_be_bytes(),
            ByteOrder::Little => unit.to_le_bytes(),
        }
    }

    fn write_u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }
}

pub(super) fn decoder(encoding: Encoding, mode: ErrorMode) -> Box<dyn Decoder> {
    match encoding {
        Encoding::UTF16 => Box::new(Utf16Decoder::new(encoding, None, mode)),
        Encoding::UTF16BE => Box::new(Utf16Decoder::new(encoding, Some(ByteOrder::Big), mode)),
        Encoding::UTF16LE => Box::new(Utf16Decoder::new(encoding, Some(ByteOrder::Little), mode)),
        Encoding::UTF32 => Box::new(Utf32Decoder::new(encoding, None, mode)),
        Encoding::UTF32BE => Box::new(Utf32Decoder::new(encoding, Some(ByteOrder::Big), mode)),
        Encoding::UTF32LE => Box::new(Utf32Decoder::new(encoding, Some(ByteOrder::Little), mode)),
        _ => Box::new(Utf8Decoder { mode }),
    }
}

pub(super) fn encoder(encoding: Encoding, mode: ErrorMode, substitution: char) -> Box<dyn Encoder> {
    let (width, order, bom) = match encoding {
        Encoding::UTF16 => (Width::Sixteen, ByteOrder::Big, true),
        Encoding::UTF16BE => (Width::Sixteen, ByteOrder::Big, false),
        Encoding::UTF16LE => (Width::Sixteen, ByteOrder::Little, false),
        Encoding::UTF32 => (Width::ThirtyTwo, ByteOrder::Big, true),
        Encoding::UTF32BE => (Width::ThirtyTwo, ByteOrder::Big, false),
        Encoding::UTF32LE => (Width::ThirtyTwo, ByteOrder::Little, false),
        _ => (Width::Eight, ByteOrder::Big, false),
    };
    Box::new(UnicodeEncoder {
        encoding,
        width,
        order,
        bom_pending: bom,
        mode,
        substitution,
    })
}

fn push_str(text: &str, out: &mut dyn Sink<u16>) {
    for unit in text.encode_utf16() {
        out.push(unit);
    }
}

struct Utf8Decoder {
    mode: ErrorMode,
}

impl Decoder for Utf8Decoder {
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize> {
        let mut pos = 0;
        loop {
            let rest = &input[pos..];
            let error = match std::str::from_utf8(rest) {
                Ok(text) => {
                    push_str(text, out);
                    return Ok(input.len());
                }
                Err(error) => error,
            };

            let valid = error.valid_up_to();
            push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default(), out);
            pos += valid;

            match error.error_len() {
                // Truncated sequence at the end of this chunk
                None if !last => return Ok(pos),
                None => {
                    malformed(self.mode, Encoding::UTF8, offset + pos, out)?;
                    return Ok(input.len());
                }
                Some(len) => {
                    malformed(self.mode, Encoding::UTF8, offset + pos, out)?;
                    pos += len;
                }
            }
        }
    }
}

struct Utf16Decoder {
    encoding: Encoding,
    /// `None` until the BOM has been examined
    order: Option<ByteOrder>,
    mode: ErrorMode,
}

impl Utf16Decoder {
    fn new(encoding: Encoding, order: Option<ByteOrder>, mode: ErrorMode) -> Self {
        Self {
            encoding,
            order,
            mode,
        }
    }
}

impl Decoder for Utf16Decoder {
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize> {
        let mut pos = 0;
        let order = match self.order {
            Some(order) => order,
            None => {
                if input.len() < 2 && !last {
                    return Ok(0);
                }
                let (order, bom_len) = match input {
                    [0xFE, 0xFF, ..] => (ByteOrder::Big, 2),
                    [0xFF, 0xFE, ..] => (ByteOrder::Little, 2),
                    _ => (ByteOrder::Big, 0),
                };
                self.order = Some(order);
                pos = bom_len;
                order
            }
        };

        while pos + 2 <= input.len() {
            let unit = order.read_u16([input[pos], input[pos + 1]]);
            match unit {
                0xD800..=0xDBFF => {
                    if pos + 4 > input.len() {
                        if !last {
                            return Ok(pos);
                        }
                        malformed(self.mode, self.encoding, offset + pos, out)?;
                        pos += 2;
                        continue;
                    }
                    let next = order.read_u16([input[pos + 2], input[pos + 3]]);
                    if (0xDC00..=0xDFFF).contains(&next) {
                        out.push(unit);
                        out.push(next);
                        pos += 4;
                    } else {
                        malformed(self.mode, self.encoding, offset + pos, out)?;
                        pos += 2;
                    }
                }
                0xDC00..=0xDFFF => {
                    malformed(self.mode, self.encoding, offset + pos, out)?;
                    pos += 2;
                }
                _ => {
                    out.push(unit);
                    pos += 2;
                }
            }
        }

        if pos < input.len() {
            if !last {
                return Ok(pos);
            }
            malformed(self.mode, self.encoding, offset + pos, out)?;
        }
        Ok(input.len())
    }
}

struct Utf32Decoder {
    encoding: Encoding,
    order: Option<ByteOrder>,
    mode: ErrorMode,
}

impl Utf32Decoder {
    fn new(encoding: Encoding, order: Option<ByteOrder>, mode: ErrorMode) -> Self {
        Self {
            encoding,
            order,
            mode,
        }
    }
}

impl Decoder for Utf32Decoder {
    fn decode(
        &mut self,
        input: &[u8],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u16>,
    ) -> Result<usize> {
        let mut pos = 0;
        let order = match self.order {
            Some(order) => order,
            None => {
                if input.len() < 4 && !last {
                    return Ok(0);
                }
                let (order, bom_len) = match input {
                    [0x00, 0x00, 0xFE, 0xFF, ..] => (ByteOrder::Big, 4),
                    [0xFF, 0xFE, 0x00, 0x00, ..] => (ByteOrder::Little, 4),
                    _ => (ByteOrder::Big, 0),
                };
                self.order = Some(order);
                pos = bom_len;
                order
            }
        };

        let mut buf = [0u16; 2];
        while pos + 4 <= input.len() {
            let value = order.read_u32([input[pos], input[pos + 1], input[pos + 2], input[pos + 3]]);
            match char::from_u32(value) {
                Some(c) => out.extend_from_slice(c.encode_utf16(&mut buf)),
                None => malformed(self.mode, self.encoding, offset + pos, out)?,
            }
            pos += 4;
        }

        if pos < input.len() {
            if !last {
                return Ok(pos);
            }
            malformed(self.mode, self.encoding, offset + pos, out)?;
        }
        Ok(input.len())
    }
}

#[derive(Debug, Clone, Copy)]
enum Width {
    Eight,
    Sixteen,
    ThirtyTwo,
}

struct UnicodeEncoder {
    encoding: Encoding,
    width: Width,
    order: ByteOrder,
    bom_pending: bool,
    mode: ErrorMode,
    substitution: char,
}

impl Encoder for UnicodeEncoder {
    fn encode(
        &mut self,
        input: &[u16],
        offset: usize,
        last: bool,
        out: &mut dyn Sink<u8>,
    ) -> Result<usize> {
        if self.bom_pending && !input.is_empty() {
            self.bom_pending = false;
            if let Some(bom) = self.encoding.bom() {
                out.extend_from_slice(bom);
            }
        }

        let (width, order) = (self.width, self.order);
        encode_scalars(
            input,
            offset,
            last,
            self.encoding,
            self.mode,
            self.substitution,
            out,
            |c, out| {
                match width {
                    Width::Eight => {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                    Width::Sixteen => {
                        let mut buf = [0u16; 2];
                        for &unit in c.encode_utf16(&mut buf).iter() {
                            out.extend_from_slice(&order.write_u16(unit));
                        }
                    }
                    Width::ThirtyTwo => out.extend_from_slice(&order.write_u32(c as u32)),
                }
                true
            },
        )
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
    fn test_utf8_keeps_bom() {
        let mut converter = CharsetConverter::new();
        let units = converter.decode("UTF-8", b"\xEF\xBB\xBFhi").unwrap();
        assert_eq!(units, vec![0xFEFF, 0x68, 0x69]);
    }

    #[test]
    fn test_utf8_error_positions() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.decode("UTF-8", b"abc\xC3"),
            Err(Error::MalformedInput { encoding: "UTF-8", position: 3 })
        );
        assert_eq!(
            converter.decode("UTF-8", b"ab\xED\xA0\x80"),
            Err(Error::MalformedInput { encoding: "UTF-8", position: 2 })
        );
    }

    #[test]
    fn test_utf8_lenient_replaces_each_subpart() {
        let mut converter = CharsetConverter::new();
        converter.set_error_mode(ErrorMode::Lenient);
        let units = converter.decode("UTF-8", b"\xF0\x9F\x8Cx\x80").unwrap();
        assert_eq!(units, vec![REPLACEMENT, 0x78, REPLACEMENT]);
    }

    #[test]
    fn test_utf16_endianness() {
        let mut converter = CharsetConverter::new();
        assert_eq!(converter.decode("UTF-16BE", &[0x00, 0x41, 0xD8, 0x3C, 0xDF, 0x0D]).unwrap(), utf16("A🌍"));
        assert_eq!(converter.decode("UTF-16LE", &[0x41, 0x00]).unwrap(), vec![0x41]);
        assert_eq!(converter.encode("UTF-16LE", &utf16("A")).unwrap(), vec![0x41, 0x00]);
        assert_eq!(converter.encode("UTF-16BE", &utf16("A")).unwrap(), vec![0x00, 0x41]);
    }

    #[test]
    fn test_utf16_sniffs_bom() {
        let mut converter = CharsetConverter::new();
        assert_eq!(converter.decode("UTF-16", &[0xFF, 0xFE, 0x41, 0x00]).unwrap(), vec![0x41]);
        assert_eq!(converter.decode("UTF-16", &[0xFE, 0xFF, 0x00, 0x41]).unwrap(), vec![0x41]);
        assert_eq!(converter.decode("UTF-16", &[0x00, 0x41]).unwrap(), vec![0x41]);
        // An explicit byte order keeps the mark as text
        assert_eq!(converter.decode("UTF-16LE", &[0xFF, 0xFE, 0x41, 0x00]).unwrap(), vec![0xFEFF, 0x41]);
        assert_eq!(converter.encode("UTF-16", &utf16("A")).unwrap(), vec![0xFE, 0xFF, 0x00, 0x41]);
    }

    #[test]
    fn test_utf16_rejects_bad_surrogates_and_odd_length() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.decode("UTF-16BE", &[0x00, 0x41, 0xDC, 0x00]),
            Err(Error::MalformedInput { encoding: "UTF-16BE", position: 2 })
        );
        assert_eq!(
            converter.decode("UTF-16BE", &[0xD8, 0x3C, 0x00, 0x41]),
            Err(Error::MalformedInput { encoding: "UTF-16BE", position: 0 })
        );
        assert_eq!(
            converter.decode("UTF-16LE", &[0x41, 0x00, 0x42]),
            Err(Error::MalformedInput { encoding: "UTF-16LE", position: 2 })
        );
    }

    #[test]
    fn test_utf32() {
        let mut converter = CharsetConverter::new();
        let bytes = [0x00, 0x01, 0xF3, 0x0D];
        assert_eq!(converter.decode("UTF-32BE", &bytes).unwrap(), utf16("🌍"));
        assert_eq!(converter.encode("UTF-32LE", &utf16("🌍")).unwrap(), vec![0x0D, 0xF3, 0x01, 0x00]);
        assert_eq!(converter.decode("UTF-32", &[0xFF, 0xFE, 0x00, 0x00, 0x41, 0x00, 0x00, 0x00]).unwrap(), vec![0x41]);
        assert_eq!(
            converter.decode("UTF-32BE", &[0x00, 0x11, 0x00, 0x00]),
            Err(Error::MalformedInput { encoding: "UTF-32BE", position: 0 })
        );
        assert_eq!(
            converter.decode("UTF-32LE", &[0x41, 0x00, 0x00]),
            Err(Error::MalformedInput { encoding: "UTF-32LE", position: 0 })
        );
    }

    #[test]
    fn test_lone_surrogate_is_unmappable() {
        let mut converter = CharsetConverter::new();
        assert_eq!(
            converter.encode("UTF-8", &[0x41, 0xD800, 0x42]),
            Err(Error::UnmappableCharacter { encoding: "UTF-8", code_point: 0xD800, position: 1 })
        );
        converter.set_error_mode(ErrorMode::Lenient);
        assert_eq!(converter.encode("UTF-8", &[0x41, 0xD800, 0x42]).unwrap(), b"A?B");
    }
}
