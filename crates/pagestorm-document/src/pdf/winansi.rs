// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsiEncoding for text drawn with the standard fonts.

/// Substituted for characters the encoding cannot represent.
const REPLACEMENT: u8 = b'?';

/// Encode `text` as WinAnsi bytes, one byte per character.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(ch: char) -> u8 {
    match ch {
        ' '..='~' | '\u{a0}'..='\u{ff}' => ch as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => REPLACEMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(encode("Page 12 (A4)"), b"Page 12 (A4)".to_vec());
    }

    #[test]
    fn dashes_and_quotes_use_the_windows_range() {
        assert_eq!(encode("a — b"), vec![b'a', b' ', 0x97, b' ', b'b']);
        assert_eq!(encode("–\u{2019}€"), vec![0x96, 0x92, 0x80]);
    }

    #[test]
    fn latin1_maps_to_itself_and_the_rest_is_replaced() {
        assert_eq!(encode("é×"), vec![0xe9, 0xd7]);
        assert_eq!(encode("日本"), vec![REPLACEMENT, REPLACEMENT]);
    }
}
