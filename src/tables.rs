//! Single-byte code page tables.
//!
//! Each table maps the 256 byte values to UTF-16 code units and carries the
//! reverse mapping for encoding. Tables for the ISO-8859, Windows, KOI8, Mac
//! and IBM866 families are derived once from `encoding_rs`; ISO-8859-1,
//! US-ASCII, the EBCDIC pages and the DOS pages are spelled out here.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::Encoding;

/// Marker for a byte with no assigned character
const UNMAPPED: u16 = 0xFFFF;

/// IBM037, EBCDIC US/Canada
#[rustfmt::skip]
const IBM037: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x009C, 0x0009, 0x0086, 0x007F,
    0x0097, 0x008D, 0x008E, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    0x0010, 0x0011, 0x0012, 0x0013, 0x009D, 0x0085, 0x0008, 0x0087,
    0x0018, 0x0019, 0x0092, 0x008F, 0x001C, 0x001D, 0x001E, 0x001F,
    0x0080, 0x0081, 0x0082, 0x0083, 0x0084, 0x000A, 0x0017, 0x001B,
    0x0088, 0x0089, 0x008A, 0x008B, 0x008C, 0x0005, 0x0006, 0x0007,
    0x0090, 0x0091, 0x0016, 0x0093, 0x0094, 0x0095, 0x0096, 0x0004,
    0x0098, 0x0099, 0x009A, 0x009B, 0x0014, 0x0015, 0x009E, 0x001A,
    0x0020, 0x00A0, 0x00E2, 0x00E4, 0x00E0, 0x00E1, 0x00E3, 0x00E5,
    0x00E7, 0x00F1, 0x00A2, 0x002E, 0x003C, 0x0028, 0x002B, 0x007C,
    0x0026, 0x00E9, 0x00EA, 0x00EB, 0x00E8, 0x00ED, 0x00EE, 0x00EF,
    0x00EC, 0x00DF, 0x0021, 0x0024, 0x002A, 0x0029, 0x003B, 0x00AC,
    0x002D, 0x002F, 0x00C2, 0x00C4, 0x00C0, 0x00C1, 0x00C3, 0x00C5,
    0x00C7, 0x00D1, 0x00A6, 0x002C, 0x0025, 0x005F, 0x003E, 0x003F,
    0x00F8, 0x00C9, 0x00CA, 0x00CB, 0x00C8, 0x00CD, 0x00CE, 0x00CF,
    0x00CC, 0x0060, 0x003A, 0x0023, 0x0040, 0x0027, 0x003D, 0x0022,
    0x00D8, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067,
    0x0068, 0x0069, 0x00AB, 0x00BB, 0x00F0, 0x00FD, 0x00FE, 0x00B1,
    0x00B0, 0x006A, 0x006B, 0x006C, 0x006D, 0x006E, 0x006F, 0x0070,
    0x0071, 0x0072, 0x00AA, 0x00BA, 0x00E6, 0x00B8, 0x00C6, 0x00A4,
    0x00B5, 0x007E, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078,
    0x0079, 0x007A, 0x00A1, 0x00BF, 0x00D0, 0x00DD, 0x00DE, 0x00AE,
    0x005E, 0x00A3, 0x00A5, 0x00B7, 0x00A9, 0x00A7, 0x00B6, 0x00BC,
    0x00BD, 0x00BE, 0x005B, 0x005D, 0x00AF, 0x00A8, 0x00B4, 0x00D7,
    0x007B, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x00AD, 0x00F4, 0x00F6, 0x00F2, 0x00F3, 0x00F5,
    0x007D, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F, 0x0050,
    0x0051, 0x0052, 0x00B9, 0x00FB, 0x00FC, 0x00F9, 0x00FA, 0x00FF,
    0x005C, 0x00F7, 0x0053, 0x0054, 0x0055, 0x0056, 0x0057, 0x0058,
    0x0059, 0x005A, 0x00B2, 0x00D4, 0x00D6, 0x00D2, 0x00D3, 0x00D5,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037,
    0x0038, 0x0039, 0x00B3, 0x00DB, 0x00DC, 0x00D9, 0x00DA, 0x009F,
];

/// IBM437 bytes 0x80..=0xFF
const IBM437_HIGH: &str = "ÇüéâäàåçêëèïîìÄÅÉæÆôöòûùÿÖÜ¢£¥₧ƒáíóúñÑªº¿⌐¬½¼¡«»░▒▓│┤╡╢╖╕╣║╗╝╜╛┐└┴┬├─┼╞╟╚╔╩╦╠═╬╧╨╤╥╙╘╒╓╫╪┘┌█▄▌▐▀αßΓπΣσµτΦΘΩδ∞φε∩≡±≥≤⌠⌡÷≈°∙·√ⁿ²■\u{A0}";

/// IBM850 bytes 0x80..=0xFF
const IBM850_HIGH: &str = "ÇüéâäàåçêëèïîìÄÅÉæÆôöòûùÿÖÜø£Ø×ƒáíóúñÑªº¿®¬½¼¡«»░▒▓│┤ÁÂÀ©╣║╗╝¢¥┐└┴┬├─┼ãÃ╚╔╩╦╠═╬¤ðÐÊËÈıÍÎÏ┘┌█▄¦Ì▀ÓßÔÒõÕµþÞÚÛÙýÝ¯´\u{AD}±‗¾¶§÷¸°¨·¹³²■\u{A0}";

/// Byte to code unit mapping for one single-byte encoding
#[derive(Debug, Clone)]
pub(crate) struct CodePage {
    /// Code unit for each byte, `UNMAPPED` where none is assigned
    to_unicode: [u16; 256],
    /// One bit per unmapped byte
    unmapped_mask: [u64; 4],
    /// Reverse mapping sorted by code unit
    from_unicode: Vec<(u16, u8)>,
}

impl CodePage {
    fn from_table(to_unicode: [u16; 256]) -> Self {
        let mut unmapped_mask = [0u64; 4];
        let mut from_unicode = Vec::with_capacity(256);

        for (byte, &unit) in to_unicode.iter().enumerate() {
            if unit == UNMAPPED {
                unmapped_mask[byte / 64] |= 1u64 << (byte % 64);
            } else {
                from_unicode.push((unit, byte as u8));
            }
        }

        // Several bytes may share a character; the lowest byte wins.
        from_unicode.sort_unstable();
        from_unicode.dedup_by_key(|(unit, _)| *unit);

        Self {
            to_unicode,
            unmapped_mask,
            from_unicode,
        }
    }

    /// Check if a byte has an assigned character
    #[inline]
    pub(crate) fn is_mappable(&self, byte: u8) -> bool {
        let byte = byte as usize;
        (self.unmapped_mask[byte / 64] & (1u64 << (byte % 64))) == 0
    }

    #[inline]
    pub(crate) fn decode(&self, byte: u8) -> Option<u16> {
        if self.is_mappable(byte) {
            Some(self.to_unicode[byte as usize])
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn encode(&self, unit: u16) -> Option<u8> {
        self.from_unicode
            .binary_search_by_key(&unit, |&(u, _)| u)
            .ok()
            .map(|index| self.from_unicode[index].1)
    }
}

static CODE_PAGES: Lazy<HashMap<Encoding, CodePage>> = Lazy::new(|| {
    let pages: HashMap<_, _> = Encoding::ALL
        .iter()
        .filter_map(|&encoding| table_for(encoding).map(|table| (encoding, CodePage::from_table(table))))
        .collect();
    tracing::debug!(count = pages.len(), "built single-byte code pages");
    pages
});

/// Code page for a single-byte encoding, `None` for every other family
pub(crate) fn code_page(encoding: Encoding) -> Option<&'static CodePage> {
    CODE_PAGES.get(&encoding)
}

fn table_for(encoding: Encoding) -> Option<[u16; 256]> {
    let table = match encoding {
        Encoding::ASCII => ascii_table(),
        Encoding::ISO_8859_1 => std::array::from_fn(|byte| byte as u16),
        Encoding::ISO_8859_2 => derived(encoding_rs::ISO_8859_2),
        Encoding::ISO_8859_3 => derived(encoding_rs::ISO_8859_3),
        Encoding::ISO_8859_4 => derived(encoding_rs::ISO_8859_4),
        Encoding::ISO_8859_5 => derived(encoding_rs::ISO_8859_5),
        Encoding::ISO_8859_6 => derived(encoding_rs::ISO_8859_6),
        Encoding::ISO_8859_7 => derived(encoding_rs::ISO_8859_7),
        Encoding::ISO_8859_8 => derived(encoding_rs::ISO_8859_8),
        // Latin-5 and TIS-620 are their Windows pages with C1 controls restored.
        Encoding::ISO_8859_9 => with_c1_controls(derived(encoding_rs::WINDOWS_1254)),
        Encoding::ISO_8859_10 => derived(encoding_rs::ISO_8859_10),
        Encoding::ISO_8859_11 => with_c1_controls(derived(encoding_rs::WINDOWS_874)),
        Encoding::ISO_8859_13 => derived(encoding_rs::ISO_8859_13),
        Encoding::ISO_8859_14 => derived(encoding_rs::ISO_8859_14),
        Encoding::ISO_8859_15 => derived(encoding_rs::ISO_8859_15),
        Encoding::ISO_8859_16 => derived(encoding_rs::ISO_8859_16),
        Encoding::WINDOWS_874 => derived(encoding_rs::WINDOWS_874),
        Encoding::WINDOWS_1250 => derived(encoding_rs::WINDOWS_1250),
        Encoding::WINDOWS_1251 => derived(encoding_rs::WINDOWS_1251),
        Encoding::WINDOWS_1252 => derived(encoding_rs::WINDOWS_1252),
        Encoding::WINDOWS_1253 => derived(encoding_rs::WINDOWS_1253),
        Encoding::WINDOWS_1254 => derived(encoding_rs::WINDOWS_1254),
        Encoding::WINDOWS_1255 => derived(encoding_rs::WINDOWS_1255),
        Encoding::WINDOWS_1256 => derived(encoding_rs::WINDOWS_1256),
        Encoding::WINDOWS_1257 => derived(encoding_rs::WINDOWS_1257),
        Encoding::WINDOWS_1258 => derived(encoding_rs::WINDOWS_1258),
        Encoding::KOI8_R => derived(encoding_rs::KOI8_R),
        Encoding::KOI8_U => derived(encoding_rs::KOI8_U),
        Encoding::IBM866 => derived(encoding_rs::IBM866),
        Encoding::MAC_ROMAN => derived(encoding_rs::MACINTOSH),
        Encoding::MAC_CYRILLIC => derived(encoding_rs::X_MAC_CYRILLIC),
        Encoding::EBCDIC_037 => IBM037,
        Encoding::EBCDIC_500 => ibm500(),
        Encoding::CP_437 => with_high_half(IBM437_HIGH),
        Encoding::CP_850 => with_high_half(IBM850_HIGH),
        _ => return None,
    };
    Some(table)
}

/// ASCII identity below 0x80, nothing above
fn ascii_table() -> [u16; 256] {
    std::array::from_fn(|byte| if byte < 0x80 { byte as u16 } else { UNMAPPED })
}

/// Upper half taken byte by byte from an `encoding_rs` single-byte codec
fn derived(codec: &'static encoding_rs::Encoding) -> [u16; 256] {
    let mut table = ascii_table();
    for byte in 0x80..=0xFFu8 {
        if let Some(text) = codec.decode_without_bom_handling_and_without_replacement(&[byte]) {
            let mut units = text.encode_utf16();
            if let (Some(unit), None) = (units.next(), units.next()) {
                table[byte as usize] = unit;
            }
        }
    }
    table
}

fn with_c1_controls(mut table: [u16; 256]) -> [u16; 256] {
    for byte in 0x80..0xA0 {
        table[byte] = byte as u16;
    }
    table
}

fn with_high_half(high: &str) -> [u16; 256] {
    let mut table = ascii_table();
    for (slot, ch) in table[0x80..].iter_mut().zip(high.chars()) {
        *slot = ch as u16;
    }
    table
}

/// IBM500 differs from IBM037 in seven positions
fn ibm500() -> [u16; 256] {
    let mut table = IBM037;
    for (byte, ch) in [
        (0x4A, '['),
        (0x4F, '!'),
        (0x5A, ']'),
        (0x5F, '^'),
        (0xB0, '¢'),
        (0xBA, '¬'),
        (0xBB, '|'),
    ] {
        table[byte] = ch as u16;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Family;

    fn page(encoding: Encoding) -> &'static CodePage {
        code_page(encoding).unwrap()
    }

    #[test]
    fn test_every_single_byte_encoding_has_a_page() {
        for &encoding in Encoding::ALL {
            assert_eq!(
                code_page(encoding).is_some(),
                encoding.family() == Family::SingleByte,
                "{encoding}"
            );
        }
    }

    #[test]
    fn test_dos_pages_are_complete() {
        assert_eq!(IBM437_HIGH.chars().count(), 128);
        assert_eq!(IBM850_HIGH.chars().count(), 128);
        assert_eq!(page(Encoding::CP_437).decode(0x80), Some('Ç' as u16));
        assert_eq!(page(Encoding::CP_437).decode(0xB0), Some('░' as u16));
        assert_eq!(page(Encoding::CP_850).decode(0x9B), Some('ø' as u16));
        assert_eq!(page(Encoding::CP_850).decode(0xFF), Some(0xA0));
    }

    #[test]
    fn test_ebcdic_037_alphabet() {
        let ebcdic = page(Encoding::EBCDIC_037);
        let upper: Vec<u16> = [
            0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, // A-I
            0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, // J-R
            0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, // S-Z
        ]
        .iter()
        .map(|&b| ebcdic.decode(b).unwrap())
        .collect();
        assert_eq!(String::from_utf16(&upper).unwrap(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(ebcdic.decode(0x40), Some(0x20));
        assert_eq!(ebcdic.encode('0' as u16), Some(0xF0));
    }

    #[test]
    fn test_ibm500_differs_from_037() {
        assert_eq!(page(Encoding::EBCDIC_500).decode(0x4A), Some('[' as u16));
        assert_eq!(page(Encoding::EBCDIC_037).decode(0x4A), Some('¢' as u16));
        assert_eq!(page(Encoding::EBCDIC_500).decode(0xC1), Some('A' as u16));
    }

    #[test]
    fn test_windows_1252_derived_from_encoding_rs() {
        let cp1252 = page(Encoding::WINDOWS_1252);
        assert_eq!(cp1252.decode(0x80), Some(0x20AC));
        assert_eq!(cp1252.decode(0x99), Some(0x2122));
        assert_eq!(cp1252.encode(0x20AC), Some(0x80));
    }

    #[test]
    fn test_iso_pages() {
        assert_eq!(page(Encoding::ISO_8859_1).decode(0xE9), Some(0xE9));
        assert_eq!(page(Encoding::ISO_8859_1).decode(0x85), Some(0x85));
        assert_eq!(page(Encoding::ISO_8859_9).decode(0xD0), Some(0x011E));
        assert_eq!(page(Encoding::ISO_8859_9).decode(0x80), Some(0x80));
        assert_eq!(page(Encoding::ISO_8859_11).decode(0xA1), Some(0x0E01));
        assert_eq!(page(Encoding::ISO_8859_5).decode(0xB0), Some(0x0410));
        assert_eq!(page(Encoding::ISO_8859_15).decode(0xA4), Some(0x20AC));
    }

    #[test]
    fn test_unmapped_bytes() {
        assert!(!page(Encoding::ISO_8859_3).is_mappable(0xA5));
        assert_eq!(page(Encoding::ISO_8859_3).decode(0xA5), None);
        assert!(!page(Encoding::ASCII).is_mappable(0x80));
        assert!(page(Encoding::ASCII).is_mappable(0x7F));
        assert_eq!(page(Encoding::ASCII).encode(0xE9), None);
        assert_eq!(page(Encoding::ISO_8859_1).encode(0x20AC), None);
    }

    #[test]
    fn test_mapped_bytes_round_trip() {
        for encoding in [
            Encoding::ISO_8859_1,
            Encoding::ISO_8859_2,
            Encoding::ISO_8859_9,
            Encoding::WINDOWS_1251,
            Encoding::KOI8_R,
            Encoding::EBCDIC_037,
            Encoding::CP_437,
        ] {
            let page = page(encoding);
            for byte in 0..=255u8 {
                if let Some(unit) = page.decode(byte) {
                    assert_eq!(page.encode(unit), Some(byte), "{encoding} 0x{byte:02X}");
                }
            }
        }
    }
}
