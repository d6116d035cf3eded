//! WinAnsiEncoding, the single-byte table used for simple fonts.
//!
//! Codes 0x20-0x7E and 0xA0-0xFF map straight to the Unicode code point of
//! the same value. 0x80-0x9F hold the Windows-1252 specials listed in
//! [`WIN_ANSI_SPECIALS`]; the remaining slots (control codes, 0x7F, 0x81,
//! 0x8D, 0x8F, 0x90, 0x9D) are undefined. Characters without a slot are
//! shown through a glyph-indexed composite font instead.

/// Windows-1252 characters in the 0x80-0x9F range.
pub const WIN_ANSI_SPECIALS: [(u8, char); 27] = [
    (0x80, '\u{20AC}'), // Euro sign
    (0x82, '\u{201A}'), // Single low-9 quotation mark
    (0x83, '\u{0192}'), // Latin small letter f with hook
    (0x84, '\u{201E}'), // Double low-9 quotation mark
    (0x85, '\u{2026}'), // Horizontal ellipsis
    (0x86, '\u{2020}'), // Dagger
    (0x87, '\u{2021}'), // Double dagger
    (0x88, '\u{02C6}'), // Modifier letter circumflex accent
    (0x89, '\u{2030}'), // Per mille sign
    (0x8A, '\u{0160}'), // Latin capital letter S with caron
    (0x8B, '\u{2039}'), // Single left-pointing angle quotation mark
    (0x8C, '\u{0152}'), // Latin capital ligature OE
    (0x8E, '\u{017D}'), // Latin capital letter Z with caron
    (0x91, '\u{2018}'), // Left single quotation mark
    (0x92, '\u{2019}'), // Right single quotation mark
    (0x93, '\u{201C}'), // Left double quotation mark
    (0x94, '\u{201D}'), // Right double quotation mark
    (0x95, '\u{2022}'), // Bullet
    (0x96, '\u{2013}'), // En dash
    (0x97, '\u{2014}'), // Em dash
    (0x98, '\u{02DC}'), // Small tilde
    (0x99, '\u{2122}'), // Trade mark sign
    (0x9A, '\u{0161}'), // Latin small letter s with caron
    (0x9B, '\u{203A}'), // Single right-pointing angle quotation mark
    (0x9C, '\u{0153}'), // Latin small ligature oe
    (0x9E, '\u{017E}'), // Latin small letter z with caron
    (0x9F, '\u{0178}'), // Latin capital letter Y with diaeresis
];

/// Map a character to its WinAnsi code, if it has one.
pub fn encode_char(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    WIN_ANSI_SPECIALS
        .iter()
        .find(|(_, special)| *special == ch)
        .map(|(code, _)| *code)
}

/// Map a WinAnsi code back to its character; `None` for undefined slots.
pub fn decode_byte(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => WIN_ANSI_SPECIALS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, ch)| *ch),
        _ => None,
    }
}

/// Check if a character can be shown through the single-byte table.
pub fn is_encodable(ch: char) -> bool {
    encode_char(ch).is_some()
}

/// Encode a run of characters that are all encodable.
///
/// Characters without a code are dropped; callers split text with
/// [`split_runs`] first.
pub fn encode_str(text: &str) -> Vec<u8> {
    text.chars().filter_map(encode_char).collect()
}

/// A maximal slice of text that is entirely encodable or entirely not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    /// Whether every character in the run has a WinAnsi code
    pub encodable: bool,
    /// The run's characters
    pub text: &'a str,
}

/// Split text into alternating encodable / glyph-indexed runs, in order.
///
/// # Examples
///
/// ```
/// use scene_pdf::fonts::encoding::split_runs;
///
/// let runs = split_runs("Hi \u{4E2D}\u{6587}!");
/// assert_eq!(runs.len(), 3);
/// assert!(runs[0].encodable);
/// assert_eq!(runs[1].text, "\u{4E2D}\u{6587}");
/// assert!(!runs[1].encodable);
/// ```
pub fn split_runs(text: &str) -> Vec<TextRun<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let encodable = is_encodable(ch);
        match current {
            Some(kind) if kind == encodable => {},
            Some(kind) => {
                runs.push(TextRun {
                    encodable: kind,
                    text: &text[start..idx],
                });
                start = idx;
                current = Some(encodable);
            },
            None => current = Some(encodable),
        }
    }
    if let Some(kind) = current {
        runs.push(TextRun {
            encodable: kind,
            text: &text[start..],
        });
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_maps_directly() {
        assert_eq!(encode_char('A'), Some(0x41));
        assert_eq!(encode_char(' '), Some(0x20));
        assert_eq!(encode_char('~'), Some(0x7E));
    }

    #[test]
    fn test_control_and_delete_are_undefined() {
        assert_eq!(encode_char('\n'), None);
        assert_eq!(encode_char('\u{7F}'), None);
        assert_eq!(decode_byte(0x09), None);
        assert_eq!(decode_byte(0x7F), None);
    }

    #[test]
    fn test_specials_and_holes() {
        assert_eq!(encode_char('\u{20AC}'), Some(0x80));
        assert_eq!(encode_char('\u{2014}'), Some(0x97));
        for hole in [0x81u8, 0x8D, 0x8F, 0x90, 0x9D] {
            assert_eq!(decode_byte(hole), None, "slot {:#x} should be undefined", hole);
        }
        // C1 controls have no code even though their value is below 0xA0
        assert_eq!(encode_char('\u{0081}'), None);
    }

    #[test]
    fn test_latin1_upper_half() {
        assert_eq!(encode_char('\u{E9}'), Some(0xE9));
        assert_eq!(decode_byte(0xFF), Some('\u{FF}'));
    }

    #[test]
    fn test_decode_inverts_encode() {
        for code in 0u8..=255 {
            if let Some(ch) = decode_byte(code) {
                assert_eq!(encode_char(ch), Some(code));
            }
        }
    }

    #[test]
    fn test_split_runs_alternates() {
        let runs = split_runs("ab\u{3042}\u{3044}cd\u{1F600}");
        let kinds: Vec<bool> = runs.iter().map(|r| r.encodable).collect();
        assert_eq!(kinds, vec![true, false, true, false]);
        assert_eq!(runs[2].text, "cd");
        assert_eq!(runs[3].text, "\u{1F600}");
    }

    #[test]
    fn test_split_runs_empty() {
        assert!(split_runs("").is_empty());
    }

    #[test]
    fn test_encode_str_with_special() {
        assert_eq!(encode_str("\u{201C}x\u{201D}"), vec![0x93, b'x', 0x94]);
    }
}
