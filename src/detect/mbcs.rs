//! Recognizer for the multi-byte CJK charsets.
//!
//! The sample is walked one character at a time following the lead/trail
//! byte structure of the charset. Characters that fit the structure are
//! decoded to check they exist, and counted as common when they belong to
//! the frequent characters of the charset's language. The score grows
//! with the logarithm of the common count.

use encoding_rs::DecoderResult;

/// Lead/trail byte structure of a multi-byte charset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scheme {
    ShiftJis,
    /// EUC-JP and EUC-KR
    Euc,
    Gb18030,
    Big5,
}

/// One character boundary found in the sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Char {
    len: usize,
    bad: bool,
}

impl Char {
    fn ok(len: usize) -> Self {
        Self { len, bad: false }
    }

    fn bad(len: usize) -> Self {
        Self { len, bad: true }
    }

    fn new(len: usize, bad: bool) -> Self {
        Self { len, bad }
    }
}

impl Scheme {
    /// The character starting at `bytes[0]`; `bytes` is never empty
    fn next_char(self, bytes: &[u8]) -> Char {
        let c1 = bytes[0];
        match self {
            Scheme::ShiftJis => {
                if c1 <= 0x7F || (0xA1..=0xDF).contains(&c1) {
                    return Char::ok(1);
                }
                let Some(&c2) = bytes.get(1) else {
                    return Char::bad(1);
                };
                Char::new(2, c2 < 0x40 || c2 == 0x7F || c2 > 0xFC)
            }
            Scheme::Euc => {
                if c1 <= 0x8D {
                    return Char::ok(1);
                }
                let Some(&c2) = bytes.get(1) else {
                    return Char::bad(1);
                };
                match c1 {
                    0xA1..=0xFE | 0x8E => Char::new(2, c2 < 0xA1),
                    // JIS X 0212, three bytes
                    0x8F => match bytes.get(2) {
                        Some(&c3) => Char::new(3, c2 < 0xA1 || c3 < 0xA1),
                        None => Char::bad(2),
                    },
                    _ => Char::bad(2),
                }
            }
            Scheme::Gb18030 => {
                if c1 <= 0x80 {
                    return Char::ok(1);
                }
                let Some(&c2) = bytes.get(1) else {
                    return Char::bad(1);
                };
                if c1 <= 0xFE {
                    if (0x40..=0x7E).contains(&c2) || (0x80..=0xFE).contains(&c2) {
                        return Char::ok(2);
                    }
                    if (0x30..=0x39).contains(&c2) {
                        if let [_, _, c3, c4, ..] = *bytes {
                            if (0x81..=0xFE).contains(&c3) && (0x30..=0x39).contains(&c4) {
                                return Char::ok(4);
                            }
                        }
                    }
                }
                Char::bad(1)
            }
            Scheme::Big5 => {
                if c1 <= 0x7F || c1 == 0xFF {
                    return Char::ok(1);
                }
                let Some(&c2) = bytes.get(1) else {
                    return Char::bad(1);
                };
                Char::new(2, c2 < 0x40 || c2 == 0x7F || c2 == 0xFF)
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    total: usize,
    single: usize,
    double: usize,
    bad: usize,
    common: usize,
}

/// Decode one multi-byte character, or `None` when the charset has no such character
fn decode_char(codec: &'static encoding_rs::Encoding, bytes: &[u8]) -> Option<char> {
    let mut decoder = codec.new_decoder_without_bom_handling();
    let mut units = [0u16; 4];
    let (result, _, written) = decoder.decode_to_utf16_without_replacement(bytes, &mut units, true);
    if result != DecoderResult::InputEmpty || written == 0 {
        return None;
    }
    char::decode_utf16(units[..written].iter().copied())
        .next()
        .and_then(|c| c.ok())
}

fn count(
    scheme: Scheme,
    codec: &'static encoding_rs::Encoding,
    common: &[char],
    bytes: &[u8],
) -> Counts {
    let mut counts = Counts::default();
    let mut i = 0;
    while i < bytes.len() {
        let mut c = scheme.next_char(&bytes[i..]);
        let start = i;
        i += c.len;
        counts.total += 1;

        let mut decoded = None;
        if !c.bad && c.len > 1 {
            decoded = decode_char(codec, &bytes[start..i]);
            c.bad = decoded.is_none();
        }

        if c.bad {
            counts.bad += 1;
        } else if c.len == 1 {
            counts.single += 1;
        } else {
            counts.double += 1;
            if decoded.is_some_and(|ch| common.binary_search(&ch).is_ok()) {
                counts.common += 1;
            }
        }

        if counts.bad >= 2 && counts.bad * 5 >= counts.double {
            break;
        }
    }
    counts
}

pub(crate) fn confidence(
    scheme: Scheme,
    codec: &'static encoding_rs::Encoding,
    common: &[char],
    bytes: &[u8],
) -> u8 {
    let counts = count(scheme, codec, common, bytes);
    tracing::trace!(
        charset = codec.name(),
        single = counts.single,
        double = counts.double,
        bad = counts.bad,
        common = counts.common,
        "multi-byte character counts"
    );

    if counts.double <= 10 && counts.bad == 0 {
        // Too few multi-byte characters to tell
        if counts.double == 0 && counts.total < 10 { 0 } else { 10 }
    } else if counts.double < 20 * counts.bad {
        0
    } else if common.is_empty() {
        (30 + counts.double as i64 - 20 * counts.bad as i64).clamp(0, 100) as u8
    } else {
        let scale = 90.0 / (counts.double as f64 / 4.0).ln();
        (((counts.common + 1) as f64).ln() * scale + 10.0).min(100.0) as u8
    }
}
