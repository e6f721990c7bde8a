//! Font metrics and measured-width word wrapping.
//!
//! Width tables are the Adobe AFM advance widths for the built-in Helvetica
//! family, in units of 1/1000 em. The oblique face shares the regular face's
//! widths. Wrapping decisions are made against the rendered width of the
//! text at its font and size, never against character counts.

/// Font faces the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// Helvetica advance widths for printable ASCII (0x20..=0x7E).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for printable ASCII (0x20..=0x7E).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Advance width of one glyph in 1/1000 em.
///
/// Glyphs outside the table (non-ASCII other than the mid-dot bullet) are
/// approximated at the digit width; the renderer only ever emits ASCII text
/// plus the bullet glyph.
fn glyph_width(style: FontStyle, ch: char) -> u16 {
    let table = match style {
        FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        FontStyle::Regular | FontStyle::Oblique => &HELVETICA_WIDTHS,
    };
    match ch {
        ' '..='~' => table[ch as usize - 0x20],
        // periodcentered, the bullet glyph
        '\u{B7}' => 278,
        _ => 556,
    }
}

/// Rendered width of `text` at `size` points.
pub fn text_width(style: FontStyle, size: f32, text: &str) -> f32 {
    let units: u32 = text.chars().map(|ch| glyph_width(style, ch) as u32).sum();
    units as f32 * size / 1000.0
}

/// Measured-width word wrap.
///
/// Splits on whitespace and greedily accumulates words into a line while the
/// rendered width stays within `max_width`; when the next word would exceed
/// it, the line is flushed and a new one starts. A single word wider than
/// `max_width` occupies its own line and may exceed the limit. Embedded
/// newlines split the text into independently wrapped segments. Empty input
/// yields no lines.
pub fn wrap(text: &str, style: FontStyle, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for segment in text.split('\n') {
        let mut current = String::new();
        for word in segment.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate_width =
                text_width(style, size, &current) + text_width(style, size, &format!(" {word}"));
            if candidate_width <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_text_measures_wider_than_regular() {
        let regular = text_width(FontStyle::Regular, 12.0, "Diagnosis");
        let bold = text_width(FontStyle::Bold, 12.0, "Diagnosis");
        assert!(bold > regular, "bold {bold} should exceed regular {regular}");
    }

    #[test]
    fn oblique_shares_regular_widths() {
        let text = "Generated by Smart Skin Health";
        assert_eq!(
            text_width(FontStyle::Oblique, 10.0, text),
            text_width(FontStyle::Regular, 10.0, text),
        );
    }

    #[test]
    fn width_scales_linearly_with_size() {
        let at_12 = text_width(FontStyle::Regular, 12.0, "wrap me");
        let at_24 = text_width(FontStyle::Regular, 24.0, "wrap me");
        assert!((at_24 - 2.0 * at_12).abs() < 1e-3);
    }

    #[test]
    fn no_wrapped_line_exceeds_the_limit() {
        let text = "Topical corticosteroids, antihistamines for itching, and moisturizers \
                    to reduce dryness.";
        let max_width = 180.0;
        let lines = wrap(text, FontStyle::Regular, 12.0, max_width);
        assert!(lines.len() > 1);
        for line in &lines {
            let w = text_width(FontStyle::Regular, 12.0, line);
            assert!(w <= max_width, "line {line:?} measures {w} > {max_width}");
        }
    }

    #[test]
    fn wrapping_preserves_every_word() {
        let text = "A serious form of skin cancer that develops from pigment-producing \
                    cells (melanocytes).";
        let lines = wrap(text, FontStyle::Bold, 12.0, 150.0);
        let rejoined = lines.join(" ");
        let original: Vec<&str> = text.split_whitespace().collect();
        let recovered: Vec<&str> = rejoined.split_whitespace().collect();
        assert_eq!(original, recovered);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let lines = wrap(
            "tiny supercalifragilisticexpialidocious end",
            FontStyle::Regular,
            12.0,
            60.0,
        );
        assert_eq!(
            lines,
            vec!["tiny", "supercalifragilisticexpialidocious", "end"]
        );
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap("Age: 42", FontStyle::Bold, 12.0, 475.0);
        assert_eq!(lines, vec!["Age: 42"]);
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert!(wrap("", FontStyle::Regular, 12.0, 475.0).is_empty());
        assert!(wrap("   ", FontStyle::Regular, 12.0, 475.0).is_empty());
    }

    #[test]
    fn newlines_split_into_independent_segments() {
        let lines = wrap("first part\nsecond part", FontStyle::Regular, 12.0, 475.0);
        assert_eq!(lines, vec!["first part", "second part"]);
    }

    #[test]
    fn wrap_is_deterministic() {
        let text = "Early detection is crucial to prevent spreading.";
        let a = wrap(text, FontStyle::Regular, 12.0, 200.0);
        let b = wrap(text, FontStyle::Regular, 12.0, 200.0);
        assert_eq!(a, b);
    }
}
