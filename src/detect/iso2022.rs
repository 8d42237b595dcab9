//! ISO-2022-JP recognizer, scored by its escape sequences

const ESC: u8 = 0x1B;
const SHIFT_OUT: u8 = 0x0E;
const SHIFT_IN: u8 = 0x0F;

/// Designation sequences that may follow ESC
const ESCAPES: &[&[u8]] = &[
    b"$(C", // KS X 1001
    b"$(D", // JIS X 0212
    b"$@",  // JIS C 6226-1978
    b"$A",  // GB 2312
    b"$B",  // JIS X 0208
    b"&@",  // JIS X 0208-1990 update
    b"(B",  // ASCII
    b"(H",
    b"(I",  // JIS X 0201 katakana
    b"(J",  // JIS X 0201 roman
    b".A",  // ISO-8859-1 high half
    b".F",  // ISO-8859-7 high half
];

pub(crate) fn confidence(bytes: &[u8]) -> u8 {
    let mut hits = 0usize;
    let mut misses = 0usize;
    let mut shifts = 0usize;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            ESC => {
                let rest = &bytes[i + 1..];
                match ESCAPES.iter().find(|seq| rest.starts_with(seq)) {
                    Some(seq) => {
                        hits += 1;
                        i += seq.len();
                    }
                    None => misses += 1,
                }
            }
            SHIFT_OUT | SHIFT_IN => shifts += 1,
            _ => {}
        }
        i += 1;
    }

    quality(hits, misses, shifts)
}

fn quality(hits: usize, misses: usize, shifts: usize) -> u8 {
    if hits == 0 {
        return 0;
    }
    let (hits, misses, shifts) = (hits as i64, misses as i64, shifts as i64);
    let mut quality = (100 * hits - 100 * misses) / (hits + misses);
    // Few escapes might be accidental
    if hits + shifts < 5 {
        quality -= (5 - (hits + shifts)) * 10;
    }
    quality.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_escapes() {
        assert_eq!(confidence(b""), 0);
        assert_eq!(confidence(b"plain text"), 0);
        assert_eq!(confidence(b"\x1bZ only unknown"), 0);
    }

    #[test]
    fn test_japanese_text() {
        let (bytes, _, _) = encoding_rs::ISO_2022_JP.encode("これは日本語です。 World 今日は良い天気です。");
        // Two shifts into JIS X 0208 and two back to ASCII
        assert_eq!(confidence(&bytes), 90);
    }

    #[test]
    fn test_many_escapes() {
        let bytes = b"\x1b$B4A\x1b(B a \x1b$B;z\x1b(B b \x1b$B4A\x1b(B";
        assert_eq!(confidence(bytes), 100);
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        assert_eq!(quality(30_000_000, 0, 0), 100);
        assert_eq!(quality(30_000_000, 10_000_000, 0), 50);
        assert_eq!(quality(3, 0, 0), 80);
    }

    #[test]
    fn test_misses_lower_quality() {
        let bytes = b"\x1b$B4A\x1b(B\x1b$B4A\x1b(B\x1bZ\x1b$B4A\x1b(B\x1bZ";
        // 6 hits, 2 misses
        assert_eq!(confidence(bytes), 50);
    }
}
