//! UTF-8, UTF-16 and UTF-32 recognizers

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Bytes of a UTF-16 sample examined for plausible code units
const UTF16_CHECK_LEN: usize = 30;

pub(crate) fn utf8(bytes: &[u8]) -> u8 {
    let has_bom = bytes.starts_with(&UTF8_BOM);
    let mut valid = 0usize;
    let mut invalid = 0usize;

    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        i += 1;
        if lead & 0x80 == 0 {
            continue;
        }
        // C0, C1 and F5..=FF never start a well-formed sequence
        let mut trail = match lead {
            0xC2..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF4 => 3,
            _ => {
                invalid += 1;
                continue;
            }
        };
        // Overlong forms, surrogates and code points past U+10FFFF are
        // excluded by narrowing the first continuation byte
        let mut allowed = match lead {
            0xE0 => 0xA0..=0xBF,
            0xED => 0x80..=0x9F,
            0xF0 => 0x90..=0xBF,
            0xF4 => 0x80..=0x8F,
            _ => 0x80..=0xBF,
        };

        // A sequence cut off by the end of the sample counts either way
        while i < bytes.len() {
            let byte = bytes[i];
            if !allowed.contains(&byte) {
                invalid += 1;
                break;
            }
            i += 1;
            trail -= 1;
            if trail == 0 {
                valid += 1;
                break;
            }
            allowed = 0x80..=0xBF;
        }
    }

    if has_bom && invalid == 0 {
        100
    } else if has_bom && valid > invalid * 10 {
        80
    } else if valid > 3 && invalid == 0 {
        100
    } else if valid > 0 && invalid == 0 {
        80
    } else if valid == 0 && invalid == 0 {
        // Plain ASCII
        15
    } else if valid > invalid * 10 {
        25
    } else {
        0
    }
}

pub(crate) fn utf16(bytes: &[u8], big_endian: bool) -> u8 {
    let check = bytes.len().min(UTF16_CHECK_LEN);
    let mut confidence: i32 = 10;

    for i in (0..check.saturating_sub(1)).step_by(2) {
        let pair = [bytes[i], bytes[i + 1]];
        let unit = if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        };
        if i == 0 && unit == 0xFEFF {
            // FF FE 00 00 is the UTF-32LE signature
            confidence = if !big_endian && bytes.len() >= 4 && bytes[2] == 0 && bytes[3] == 0 {
                0
            } else {
                100
            };
            break;
        }
        confidence = adjust(unit, confidence);
        if confidence == 0 || confidence == 100 {
            break;
        }
    }

    if check < 4 && confidence < 100 {
        confidence = 0;
    }
    confidence as u8
}

fn adjust(unit: u16, confidence: i32) -> i32 {
    let confidence = if unit == 0 {
        confidence - 10
    } else if (0x20..=0xFF).contains(&unit) || unit == 0x0A {
        confidence + 10
    } else {
        confidence
    };
    confidence.clamp(0, 100)
}

pub(crate) fn utf32(bytes: &[u8], big_endian: bool) -> u8 {
    let read = |chunk: &[u8]| {
        let quad = [chunk[0], chunk[1], chunk[2], chunk[3]];
        if big_endian {
            u32::from_be_bytes(quad)
        } else {
            u32::from_le_bytes(quad)
        }
    };

    let mut chunks = bytes.chunks_exact(4).peekable();
    let has_bom = chunks.peek().is_some_and(|&chunk| read(chunk) == 0xFEFF);
    let mut valid = 0usize;
    let mut invalid = 0usize;
    for chunk in chunks {
        let value = read(chunk);
        if value >= 0x10FFFF || (0xD800..=0xDFFF).contains(&value) {
            invalid += 1;
        } else {
            valid += 1;
        }
    }

    if has_bom && invalid == 0 {
        100
    } else if has_bom && valid > invalid * 10 {
        80
    } else if valid > 3 && invalid == 0 {
        100
    } else if valid > 0 && invalid == 0 {
        80
    } else if valid > invalid * 10 {
        25
    } else {
        0
    }
}
