//! Greedy word wrapping by display width.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap `text` into lines no wider than `width` display columns.
///
/// Explicit newlines always break. Words wider than a full line are broken
/// at character boundaries. An empty string yields one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    wrap_ranges(text, width)
        .into_iter()
        .map(|range| text[range].to_string())
        .collect()
}

/// Byte ranges of the lines [`wrap_text`] produces, in order.
///
/// Every range lies on char boundaries. The space or newline a line breaks
/// at belongs to no range.
pub fn wrap_ranges(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut base = 0;
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, base, width, &mut lines);
        base += paragraph.len() + 1;
    }
    lines
}

fn wrap_paragraph(paragraph: &str, base: usize, width: usize, out: &mut Vec<Range<usize>>) {
    let mut line = base..base;
    let mut line_width = 0usize;
    let mut fresh = true;
    let mut word_start = base;

    for word in paragraph.split(' ') {
        let word_end = word_start + word.len();
        let word_width = UnicodeWidthStr::width(word);
        let needed = if fresh {
            word_width
        } else {
            line_width + 1 + word_width
        };

        if needed <= width {
            if !fresh {
                line_width += 1;
            }
            line.end = word_end;
            line_width += word_width;
            fresh = false;
            word_start = word_end + 1;
            continue;
        }

        if !fresh {
            out.push(line);
            line = word_start..word_start;
            line_width = 0;
        }

        for (offset, ch) in word.char_indices() {
            let at = word_start + offset;
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if line_width > 0 && line_width + ch_width > width {
                out.push(line);
                line = at..at;
                line_width = 0;
            }
            line.end = at + ch.len_utf8();
            line_width += ch_width;
        }
        fresh = false;
        word_start = word_end + 1;
    }

    out.push(line);
}
