// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layout — greedy word wrapping of the page body.

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
    Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi \
    ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit \
    in voluptate velit esse cillum dolore eu fugiat nulla pariatur. \
    Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia \
    deserunt mollit anim id est laborum.";

/// Average glyph advance as a fraction of the font size.
pub const AVERAGE_CHAR_WIDTH: f32 = 0.55;

/// Lower bound on the line budget.
pub const MIN_CHARS_PER_LINE: usize = 40;

/// The stock body: six copies of the Lorem paragraph.
pub fn default_body_text() -> String {
    [LOREM; 6].join(" ")
}

/// Character budget for one body line on a page `page_width` points wide.
pub fn max_chars_per_line(page_width: f32, margin: f32, font_size: f32) -> usize {
    let usable = (page_width - 2.0 * margin) / (font_size * AVERAGE_CHAR_WIDTH);
    let budget = if usable.is_finite() && usable > 0.0 {
        usable.floor() as usize
    } else {
        0
    };
    budget.max(MIN_CHARS_PER_LINE)
}

/// Greedily wrap `text` into lines of at most `max_chars` characters.
///
/// Words are never split: a word longer than the budget sits alone on its
/// own line, unmodified. Whitespace runs (including newlines) collapse to a
/// single separator.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
