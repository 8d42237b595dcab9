//! Registry of the character encodings known to the crate.
//!
//! Every encoding has one canonical IANA/ICU style name, a fixed list of
//! aliases, and a [`Family`] that selects the transcoder used by the codec.
//! Name lookup is ASCII case-insensitive exact matching; no whitespace or
//! punctuation folding is performed.

use serde::Serialize;

/// Transcoder family an encoding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// UTF-8, UTF-16 and UTF-32 in their byte orders
    Unicode,
    /// One byte per character, driven by a 256-entry code page
    SingleByte,
    /// Legacy CJK multi-byte and stateful encodings
    MultiByte,
}

impl Family {
    /// Lowercase name used by the CLI
    pub fn name(self) -> &'static str {
        match self {
            Family::Unicode => "unicode",
            Family::SingleByte => "single-byte",
            Family::MultiByte => "multi-byte",
        }
    }
}

/// Supported character encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(non_camel_case_types)]
pub enum Encoding {
    // Unicode encodings
    /// UTF-8 (1-4 bytes per scalar value)
    UTF8,
    /// UTF-16 with byte order taken from the BOM, big endian by default
    UTF16,
    /// UTF-16 big endian
    UTF16BE,
    /// UTF-16 little endian
    UTF16LE,
    /// UTF-32 with byte order taken from the BOM, big endian by default
    UTF32,
    /// UTF-32 big endian
    UTF32BE,
    /// UTF-32 little endian
    UTF32LE,

    // ASCII and Latin encodings
    /// US-ASCII (7-bit)
    ASCII,
    /// ISO-8859-1 (Latin-1) - Western European
    ISO_8859_1,
    /// ISO-8859-2 (Latin-2) - Central/Eastern European
    ISO_8859_2,
    /// ISO-8859-3 (Latin-3) - South European
    ISO_8859_3,
    /// ISO-8859-4 (Latin-4) - North European
    ISO_8859_4,
    /// ISO-8859-5 (Cyrillic)
    ISO_8859_5,
    /// ISO-8859-6 (Arabic)
    ISO_8859_6,
    /// ISO-8859-7 (Greek)
    ISO_8859_7,
    /// ISO-8859-8 (Hebrew)
    ISO_8859_8,
    /// ISO-8859-9 (Latin-5) - Turkish
    ISO_8859_9,
    /// ISO-8859-10 (Latin-6) - Nordic
    ISO_8859_10,
    /// ISO-8859-11 (Thai)
    ISO_8859_11,
    /// ISO-8859-13 (Latin-7) - Baltic Rim
    ISO_8859_13,
    /// ISO-8859-14 (Latin-8) - Celtic
    ISO_8859_14,
    /// ISO-8859-15 (Latin-9) - Western European with Euro
    ISO_8859_15,
    /// ISO-8859-16 (Latin-10) - South-Eastern European
    ISO_8859_16,

    // Windows code pages
    /// Windows-874 (Thai)
    WINDOWS_874,
    /// Windows-1250 (Central European)
    WINDOWS_1250,
    /// Windows-1251 (Cyrillic)
    WINDOWS_1251,
    /// Windows-1252 (Western European)
    WINDOWS_1252,
    /// Windows-1253 (Greek)
    WINDOWS_1253,
    /// Windows-1254 (Turkish)
    WINDOWS_1254,
    /// Windows-1255 (Hebrew)
    WINDOWS_1255,
    /// Windows-1256 (Arabic)
    WINDOWS_1256,
    /// Windows-1257 (Baltic)
    WINDOWS_1257,
    /// Windows-1258 (Vietnamese)
    WINDOWS_1258,

    // Cyrillic
    /// KOI8-R (Russian)
    KOI8_R,
    /// KOI8-U (Ukrainian)
    KOI8_U,
    /// IBM866 (DOS Cyrillic)
    IBM866,

    // Mac
    /// Mac OS Roman
    MAC_ROMAN,
    /// Mac OS Cyrillic
    MAC_CYRILLIC,

    // EBCDIC
    /// IBM037 (EBCDIC US/Canada)
    EBCDIC_037,
    /// IBM500 (EBCDIC International)
    EBCDIC_500,

    // DOS/OEM
    /// IBM437 (DOS US)
    CP_437,
    /// IBM850 (DOS Western European)
    CP_850,

    // Asian encodings
    /// Shift_JIS (Japanese)
    SHIFT_JIS,
    /// EUC-JP (Japanese)
    EUC_JP,
    /// ISO-2022-JP (Japanese, stateful 7-bit)
    ISO_2022_JP,
    /// EUC-KR (Korean)
    EUC_KR,
    /// GBK (Simplified Chinese)
    GBK,
    /// GB18030 (Chinese national standard)
    GB18030,
    /// Big5 (Traditional Chinese)
    BIG5,
}

impl Encoding {
    /// Every registered encoding, in registry order
    pub const ALL: &'static [Encoding] = &[
        Encoding::UTF8,
        Encoding::UTF16,
        Encoding::UTF16BE,
        Encoding::UTF16LE,
        Encoding::UTF32,
        Encoding::UTF32BE,
        Encoding::UTF32LE,
        Encoding::ASCII,
        Encoding::ISO_8859_1,
        Encoding::ISO_8859_2,
        Encoding::ISO_8859_3,
        Encoding::ISO_8859_4,
        Encoding::ISO_8859_5,
        Encoding::ISO_8859_6,
        Encoding::ISO_8859_7,
        Encoding::ISO_8859_8,
        Encoding::ISO_8859_9,
        Encoding::ISO_8859_10,
        Encoding::ISO_8859_11,
        Encoding::ISO_8859_13,
        Encoding::ISO_8859_14,
        Encoding::ISO_8859_15,
        Encoding::ISO_8859_16,
        Encoding::WINDOWS_874,
        Encoding::WINDOWS_1250,
        Encoding::WINDOWS_1251,
        Encoding::WINDOWS_1252,
        Encoding::WINDOWS_1253,
        Encoding::WINDOWS_1254,
        Encoding::WINDOWS_1255,
        Encoding::WINDOWS_1256,
        Encoding::WINDOWS_1257,
        Encoding::WINDOWS_1258,
        Encoding::KOI8_R,
        Encoding::KOI8_U,
        Encoding::IBM866,
        Encoding::MAC_ROMAN,
        Encoding::MAC_CYRILLIC,
        Encoding::EBCDIC_037,
        Encoding::EBCDIC_500,
        Encoding::CP_437,
        Encoding::CP_850,
        Encoding::SHIFT_JIS,
        Encoding::EUC_JP,
        Encoding::ISO_2022_JP,
        Encoding::EUC_KR,
        Encoding::GBK,
        Encoding::GB18030,
        Encoding::BIG5,
    ];

    /// Look an encoding up by canonical name or alias.
    ///
    /// Matching is ASCII case-insensitive and otherwise exact, so
    /// `"utf-8"` and `"UTF-8"` resolve while `" utf-8"` and `"utf_8"` do not.
    pub fn for_name(name: &str) -> Option<Encoding> {
        Encoding::ALL.iter().copied().find(|encoding| {
            encoding.name().eq_ignore_ascii_case(name)
                || encoding
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }

    /// Canonical name, as reported by detection
    pub fn name(self) -> &'static str {
        match self {
            // Unicode
            Encoding::UTF8 => "UTF-8",
            Encoding::UTF16 => "UTF-16",
            Encoding::UTF16BE => "UTF-16BE",
            Encoding::UTF16LE => "UTF-16LE",
            Encoding::UTF32 => "UTF-32",
            Encoding::UTF32BE => "UTF-32BE",
            Encoding::UTF32LE => "UTF-32LE",

            // ASCII and Latin
            Encoding::ASCII => "US-ASCII",
            Encoding::ISO_8859_1 => "ISO-8859-1",
            Encoding::ISO_8859_2 => "ISO-8859-2",
            Encoding::ISO_8859_3 => "ISO-8859-3",
            Encoding::ISO_8859_4 => "ISO-8859-4",
            Encoding::ISO_8859_5 => "ISO-8859-5",
            Encoding::ISO_8859_6 => "ISO-8859-6",
            Encoding::ISO_8859_7 => "ISO-8859-7",
            Encoding::ISO_8859_8 => "ISO-8859-8",
            Encoding::ISO_8859_9 => "ISO-8859-9",
            Encoding::ISO_8859_10 => "ISO-8859-10",
            Encoding::ISO_8859_11 => "ISO-8859-11",
            Encoding::ISO_8859_13 => "ISO-8859-13",
            Encoding::ISO_8859_14 => "ISO-8859-14",
            Encoding::ISO_8859_15 => "ISO-8859-15",
            Encoding::ISO_8859_16 => "ISO-8859-16",

            // Windows
            Encoding::WINDOWS_874 => "windows-874",
            Encoding::WINDOWS_1250 => "windows-1250",
            Encoding::WINDOWS_1251 => "windows-1251",
            Encoding::WINDOWS_1252 => "windows-1252",
            Encoding::WINDOWS_1253 => "windows-1253",
            Encoding::WINDOWS_1254 => "windows-1254",
            Encoding::WINDOWS_1255 => "windows-1255",
            Encoding::WINDOWS_1256 => "windows-1256",
            Encoding::WINDOWS_1257 => "windows-1257",
            Encoding::WINDOWS_1258 => "windows-1258",

            // Cyrillic
            Encoding::KOI8_R => "KOI8-R",
            Encoding::KOI8_U => "KOI8-U",
            Encoding::IBM866 => "IBM866",

            // Mac
            Encoding::MAC_ROMAN => "macintosh",
            Encoding::MAC_CYRILLIC => "x-mac-cyrillic",

            // EBCDIC
            Encoding::EBCDIC_037 => "IBM037",
            Encoding::EBCDIC_500 => "IBM500",

            // DOS/OEM
            Encoding::CP_437 => "IBM437",
            Encoding::CP_850 => "IBM850",

            // Asian
            Encoding::SHIFT_JIS => "Shift_JIS",
            Encoding::EUC_JP => "EUC-JP",
            Encoding::ISO_2022_JP => "ISO-2022-JP",
            Encoding::EUC_KR => "EUC-KR",
            Encoding::GBK => "GBK",
            Encoding::GB18030 => "GB18030",
            Encoding::BIG5 => "Big5",
        }
    }

    /// Alternative names accepted by [`Encoding::for_name`]
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Encoding::UTF8 => &["utf8", "unicode-1-1-utf-8", "unicode11utf8", "x-unicode20utf8"],
            Encoding::UTF16 => &["utf16", "unicode", "csunicode", "ucs-2"],
            Encoding::UTF16BE => &["utf16be", "unicodefffe", "x-utf-16be"],
            Encoding::UTF16LE => &["utf16le", "unicodefeff", "x-utf-16le"],
            Encoding::UTF32 => &["utf32", "ucs-4", "csucs4"],
            Encoding::UTF32BE => &["utf32be"],
            Encoding::UTF32LE => &["utf32le"],

            Encoding::ASCII => &["ascii", "ansi_x3.4-1968", "iso646-us", "us", "cp367", "ibm367", "csascii"],
            Encoding::ISO_8859_1 => &["latin1", "l1", "iso8859-1", "iso_8859-1", "iso88591", "cp819", "ibm819", "csisolatin1"],
            Encoding::ISO_8859_2 => &["latin2", "l2", "iso8859-2", "iso_8859-2", "iso88592", "csisolatin2"],
            Encoding::ISO_8859_3 => &["latin3", "l3", "iso8859-3", "iso_8859-3", "iso88593", "csisolatin3"],
            Encoding::ISO_8859_4 => &["latin4", "l4", "iso8859-4", "iso_8859-4", "iso88594", "csisolatin4"],
            Encoding::ISO_8859_5 => &["cyrillic", "iso8859-5", "iso_8859-5", "iso88595", "csisolatincyrillic"],
            Encoding::ISO_8859_6 => &["arabic", "iso8859-6", "iso_8859-6", "iso88596", "asmo-708", "ecma-114", "csisolatinarabic"],
            Encoding::ISO_8859_7 => &["greek", "greek8", "iso8859-7", "iso_8859-7", "iso88597", "elot_928", "ecma-118", "csisolatingreek"],
            Encoding::ISO_8859_8 => &["hebrew", "iso8859-8", "iso_8859-8", "iso88598", "iso-8859-8-i", "csisolatinhebrew"],
            Encoding::ISO_8859_9 => &["latin5", "l5", "iso8859-9", "iso_8859-9", "iso88599", "csisolatin5"],
            Encoding::ISO_8859_10 => &["latin6", "l6", "iso8859-10", "iso_8859-10", "iso885910", "csisolatin6"],
            Encoding::ISO_8859_11 => &["thai", "iso8859-11", "iso_8859-11", "iso885911", "tis-620"],
            Encoding::ISO_8859_13 => &["latin7", "iso8859-13", "iso_8859-13", "iso885913"],
            Encoding::ISO_8859_14 => &["latin8", "iso8859-14", "iso_8859-14", "iso885914"],
            Encoding::ISO_8859_15 => &["latin9", "latin-9", "iso8859-15", "iso_8859-15", "iso885915", "csisolatin9"],
            Encoding::ISO_8859_16 => &["latin10", "iso8859-16", "iso_8859-16", "iso885916"],

            Encoding::WINDOWS_874 => &["cp874", "x-cp874", "dos-874"],
            Encoding::WINDOWS_1250 => &["cp1250", "x-cp1250"],
            Encoding::WINDOWS_1251 => &["cp1251", "x-cp1251"],
            Encoding::WINDOWS_1252 => &["cp1252", "x-cp1252"],
            Encoding::WINDOWS_1253 => &["cp1253", "x-cp1253"],
            Encoding::WINDOWS_1254 => &["cp1254", "x-cp1254"],
            Encoding::WINDOWS_1255 => &["cp1255", "x-cp1255"],
            Encoding::WINDOWS_1256 => &["cp1256", "x-cp1256"],
            Encoding::WINDOWS_1257 => &["cp1257", "x-cp1257"],
            Encoding::WINDOWS_1258 => &["cp1258", "x-cp1258"],

            Encoding::KOI8_R => &["koi8r", "koi8", "koi", "cskoi8r"],
            Encoding::KOI8_U => &["koi8u", "koi8-ru"],
            Encoding::IBM866 => &["cp866", "866", "csibm866"],

            Encoding::MAC_ROMAN => &["mac", "macroman", "x-mac-roman", "csmacintosh"],
            Encoding::MAC_CYRILLIC => &["maccyrillic", "x-mac-ukrainian"],

            Encoding::EBCDIC_037 => &["cp037", "ebcdic-cp-us", "ebcdic-cp-ca", "ibm-37", "ibm-037", "csibm037"],
            Encoding::EBCDIC_500 => &["cp500", "ebcdic-cp-be", "ebcdic-cp-ch", "ibm-500", "csibm500"],

            Encoding::CP_437 => &["cp437", "437", "ibm-437", "cspc8codepage437"],
            Encoding::CP_850 => &["cp850", "850", "ibm-850", "cspc850multilingual"],

            Encoding::SHIFT_JIS => &["sjis", "shift-jis", "ms_kanji", "csshiftjis", "windows-31j", "x-sjis"],
            Encoding::EUC_JP => &["eucjp", "x-euc-jp", "cseucpkdfmtjapanese"],
            Encoding::ISO_2022_JP => &["iso2022jp", "csiso2022jp"],
            Encoding::EUC_KR => &["euckr", "ks_c_5601-1987", "windows-949", "cseuckr", "korean"],
            Encoding::GBK => &["gb2312", "cp936", "x-gbk", "chinese", "csgb2312", "windows-936"],
            Encoding::GB18030 => &["gb-18030"],
            Encoding::BIG5 => &["big5-hkscs", "cn-big5", "csbig5", "x-x-big5"],
        }
    }

    /// Transcoder family of this encoding
    pub fn family(self) -> Family {
        match self {
            Encoding::UTF8
            | Encoding::UTF16
            | Encoding::UTF16BE
            | Encoding::UTF16LE
            | Encoding::UTF32
            | Encoding::UTF32BE
            | Encoding::UTF32LE => Family::Unicode,
            Encoding::SHIFT_JIS
            | Encoding::EUC_JP
            | Encoding::ISO_2022_JP
            | Encoding::EUC_KR
            | Encoding::GBK
            | Encoding::GB18030
            | Encoding::BIG5 => Family::MultiByte,
            _ => Family::SingleByte,
        }
    }

    /// Whether bytes 0x00..=0x7F always stand for the ASCII characters
    pub fn is_ascii_compatible(self) -> bool {
        !matches!(
            self,
            Encoding::UTF16
                | Encoding::UTF16BE
                | Encoding::UTF16LE
                | Encoding::UTF32
                | Encoding::UTF32BE
                | Encoding::UTF32LE
                | Encoding::EBCDIC_037
                | Encoding::EBCDIC_500
                | Encoding::ISO_2022_JP
        )
    }

    /// Whether a character may take more than one byte
    pub fn is_multibyte(self) -> bool {
        self.family() != Family::SingleByte
    }

    /// Byte order mark of a Unicode encoding.
    ///
    /// The byte-order-neutral `UTF-16` and `UTF-32` report the big endian
    /// mark, which is what the encoder writes for them.
    pub fn bom(self) -> Option<&'static [u8]> {
        match self {
            Encoding::UTF8 => Some(b"\xEF\xBB\xBF"),
            Encoding::UTF16 | Encoding::UTF16BE => Some(&[0xFE, 0xFF]),
            Encoding::UTF16LE => Some(&[0xFF, 0xFE]),
            Encoding::UTF32 | Encoding::UTF32BE => Some(&[0x00, 0x00, 0xFE, 0xFF]),
            Encoding::UTF32LE => Some(&[0xFF, 0xFE, 0x00, 0x00]),
            _ => None,
        }
    }

    /// The `encoding_rs` codec backing a multi-byte encoding
    pub(crate) fn legacy_codec(self) -> Option<&'static encoding_rs::Encoding> {
        match self {
            Encoding::SHIFT_JIS => Some(encoding_rs::SHIFT_JIS),
            Encoding::EUC_JP => Some(encoding_rs::EUC_JP),
            Encoding::ISO_2022_JP => Some(encoding_rs::ISO_2022_JP),
            Encoding::EUC_KR => Some(encoding_rs::EUC_KR),
            Encoding::GBK => Some(encoding_rs::GBK),
            Encoding::GB18030 => Some(encoding_rs::GB18030),
            Encoding::BIG5 => Some(encoding_rs::BIG5),
            _ => None,
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Encoding {
    type Err = crate::Error;

    fn from_str(name: &str) -> crate::Result<Self> {
        Encoding::for_name(name).ok_or_else(|| crate::Error::UnsupportedEncoding(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Encoding::for_name("utf-8"), Some(Encoding::UTF8));
        assert_eq!(Encoding::for_name("UTF-8"), Some(Encoding::UTF8));
        assert_eq!(Encoding::for_name("shift_jis"), Some(Encoding::SHIFT_JIS));
        assert_eq!(Encoding::for_name("Windows-1252"), Some(Encoding::WINDOWS_1252));
        assert_eq!(Encoding::for_name("LATIN1"), Some(Encoding::ISO_8859_1));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Encoding::for_name(" utf-8"), None);
        assert_eq!(Encoding::for_name("utf-8 "), None);
        assert_eq!(Encoding::for_name("utf_8"), None);
        assert_eq!(Encoding::for_name(""), None);
        assert_eq!(Encoding::for_name("nonexistent-charset-xyz"), None);
    }

    #[test]
    fn test_names_and_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for encoding in Encoding::ALL {
            assert!(seen.insert(encoding.name().to_ascii_lowercase()), "{}", encoding.name());
            for alias in encoding.aliases() {
                assert!(seen.insert(alias.to_ascii_lowercase()), "{alias}");
            }
        }
    }

    #[test]
    fn test_every_name_round_trips() {
        for &encoding in Encoding::ALL {
            assert_eq!(Encoding::for_name(encoding.name()), Some(encoding));
            for alias in encoding.aliases() {
                assert_eq!(Encoding::for_name(alias), Some(encoding));
            }
        }
    }

    #[test]
    fn test_family_and_flags() {
        assert_eq!(Encoding::EBCDIC_500.name(), "IBM500");
        assert!(Encoding::GB18030.is_ascii_compatible());
        assert!(!Encoding::EBCDIC_500.is_ascii_compatible());
        assert!(!Encoding::UTF16LE.is_ascii_compatible());
        assert!(Encoding::SHIFT_JIS.is_multibyte());
        assert!(!Encoding::KOI8_R.is_multibyte());
        assert_eq!(Encoding::GB18030.family(), Family::MultiByte);
        assert_eq!(Encoding::UTF32LE.family(), Family::Unicode);
        assert_eq!(Encoding::CP_437.family(), Family::SingleByte);
    }

    #[test]
    fn test_boms() {
        assert_eq!(Encoding::UTF8.bom(), Some(&[0xEF, 0xBB, 0xBF][..]));
        assert_eq!(Encoding::UTF16LE.bom(), Some(&[0xFF, 0xFE][..]));
        assert_eq!(Encoding::UTF32LE.bom(), Some(&[0xFF, 0xFE, 0x00, 0x00][..]));
        assert_eq!(Encoding::ISO_8859_1.bom(), None);
    }

    #[test]
    fn test_only_multibyte_has_legacy_codec() {
        for &encoding in Encoding::ALL {
            assert_eq!(
                encoding.legacy_codec().is_some(),
                encoding.family() == Family::MultiByte,
                "{encoding}"
            );
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("big5".parse::<Encoding>().unwrap(), Encoding::BIG5);
        assert!(matches!(
            "klingon".parse::<Encoding>(),
            Err(crate::Error::UnsupportedEncoding(name)) if name == "klingon"
        ));
    }
}
