//! Single-byte text encodings.
//!
//! PDF defines a handful of 256-entry code tables. The lower halves of
//! WinAnsi and MacRoman agree with ASCII, so only the upper halves are
//! tabulated here. Undefined codes map to U+FFFD.

use super::glyph_list;

const NO_CHAR: char = '\u{FFFD}';

/// WinAnsiEncoding (Windows-1252) codes 0x80..=0x9F.
const WIN_ANSI_HIGH: [char; 32] = [
    '\u{20AC}', NO_CHAR, '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', NO_CHAR, '\u{017D}', NO_CHAR,
    NO_CHAR, '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', NO_CHAR, '\u{017E}', '\u{0178}',
];

/// MacRomanEncoding codes 0x80..=0xFF.
const MAC_ROMAN_HIGH: [char; 128] = [
    // 0x80
    '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}', '\u{00E1}',
    '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}', '\u{00E9}', '\u{00E8}',
    // 0x90
    '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}', '\u{00EF}', '\u{00F1}', '\u{00F3}',
    '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}', '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    // 0xA0
    '\u{2020}', '\u{00B0}', '\u{00A2}', '\u{00A3}', '\u{00A7}', '\u{2022}', '\u{00B6}', '\u{00DF}',
    '\u{00AE}', '\u{00A9}', '\u{2122}', '\u{00B4}', '\u{00A8}', '\u{2260}', '\u{00C6}', '\u{00D8}',
    // 0xB0
    '\u{221E}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{00A5}', '\u{00B5}', '\u{2202}', '\u{2211}',
    '\u{220F}', '\u{03C0}', '\u{222B}', '\u{00AA}', '\u{00BA}', '\u{03A9}', '\u{00E6}', '\u{00F8}',
    // 0xC0
    '\u{00BF}', '\u{00A1}', '\u{00AC}', '\u{221A}', '\u{0192}', '\u{2248}', '\u{2206}', '\u{00AB}',
    '\u{00BB}', '\u{2026}', '\u{00A0}', '\u{00C0}', '\u{00C3}', '\u{00D5}', '\u{0152}', '\u{0153}',
    // 0xD0
    '\u{2013}', '\u{2014}', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00F7}', '\u{25CA}',
    '\u{00FF}', '\u{0178}', '\u{2044}', '\u{00A4}', '\u{2039}', '\u{203A}', '\u{FB01}', '\u{FB02}',
    // 0xE0
    '\u{2021}', '\u{00B7}', '\u{201A}', '\u{201E}', '\u{2030}', '\u{00C2}', '\u{00CA}', '\u{00C1}',
    '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}', '\u{00CC}', '\u{00D3}', '\u{00D4}',
    // 0xF0
    NO_CHAR, '\u{00D2}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{0131}', '\u{02C6}', '\u{02DC}',
    '\u{00AF}', '\u{02D8}', '\u{02D9}', '\u{02DA}', '\u{00B8}', '\u{02DD}', '\u{02DB}', '\u{02C7}',
];

/// PDFDocEncoding codes 0x18..=0x1F (spacing accents).
const PDF_DOC_ACCENTS: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// PDFDocEncoding codes 0x80..=0xA0.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', NO_CHAR,
    '\u{20AC}',
];

/// Decode one WinAnsiEncoding byte.
pub fn win_ansi_char(code: u8) -> char {
    match code {
        0x80..=0x9F => WIN_ANSI_HIGH[(code - 0x80) as usize],
        _ => code as char,
    }
}

/// Decode one MacRomanEncoding byte.
pub fn mac_roman_char(code: u8) -> char {
    match code {
        0x80..=0xFF => MAC_ROMAN_HIGH[(code - 0x80) as usize],
        _ => code as char,
    }
}

/// Decode one PDFDocEncoding byte.
///
/// ```
/// use pdftext::fonts::encoding::pdf_doc_char;
///
/// assert_eq!(pdf_doc_char(b'A'), 'A');
/// assert_eq!(pdf_doc_char(0x84), '—');
/// assert_eq!(pdf_doc_char(0xA0), '€');
/// ```
pub fn pdf_doc_char(code: u8) -> char {
    match code {
        0x18..=0x1F => PDF_DOC_ACCENTS[(code - 0x18) as usize],
        0x7F | 0xAD => NO_CHAR,
        0x80..=0xA0 => PDF_DOC_HIGH[(code - 0x80) as usize],
        _ => code as char,
    }
}

/// Unicode for a glyph name: the glyph list first, then `uniXXXX` and
/// `uXXXX[XX]` forms.
pub fn glyph_name_to_unicode(name: &str) -> Option<char> {
    if let Some(ch) = glyph_list::lookup(name) {
        return Some(ch);
    }

    let hex = if let Some(hex) = name.strip_prefix("uni").filter(|h| h.len() == 4) {
        hex
    } else if let Some(hex) = name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())) {
        hex
    } else {
        log::debug!("Unknown glyph name '{}'", name);
        return None;
    };

    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi_char(b'a'), 'a');
        assert_eq!(win_ansi_char(0x80), '€');
        assert_eq!(win_ansi_char(0x93), '\u{201C}');
        assert_eq!(win_ansi_char(0x81), NO_CHAR);
        assert_eq!(win_ansi_char(0xE9), 'é');
    }

    #[test]
    fn test_mac_roman() {
        assert_eq!(mac_roman_char(b'Z'), 'Z');
        assert_eq!(mac_roman_char(0x8E), 'é');
        assert_eq!(mac_roman_char(0xD0), '–');
        assert_eq!(mac_roman_char(0xFF), '\u{02C7}');
    }

    #[test]
    fn test_pdf_doc() {
        assert_eq!(pdf_doc_char(0x18), '\u{02D8}');
        assert_eq!(pdf_doc_char(0x93), 'ﬁ');
        assert_eq!(pdf_doc_char(0x9F), NO_CHAR);
        assert_eq!(pdf_doc_char(0xE9), 'é');
    }

    #[test]
    fn test_glyph_name_forms() {
        assert_eq!(glyph_name_to_unicode("bullet"), Some('•'));
        assert_eq!(glyph_name_to_unicode("uni0041"), Some('A'));
        assert_eq!(glyph_name_to_unicode("u1F600"), Some('\u{1F600}'));
        assert_eq!(glyph_name_to_unicode("uniZZZZ"), None);
        assert_eq!(glyph_name_to_unicode("g123"), None);
    }
}
