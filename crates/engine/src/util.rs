use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, appending an
/// ellipsis when content was cut. Walks char boundaries so CJK alignment
/// stays correct.
pub fn truncate_display(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let str_width = UnicodeWidthStr::width(s);
    if str_width <= width {
        return s.to_string();
    }
    if width == 1 {
        return "…".to_string();
    }

    // Leave one column for the ellipsis
    let budget = width - 1;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}…", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw > width {
        let t = truncate_display(s, width);
        let tw = UnicodeWidthStr::width(t.as_str());
        // A wide char cut at the boundary can leave one column short
        format!("{}{}", t, " ".repeat(width - tw))
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Convert column index to spreadsheet letters (0 -> A, 26 -> AA).
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ascii_and_cjk() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("世界"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_fits_untouched() {
        assert_eq!(truncate_display("abc", 5), "abc");
        assert_eq!(truncate_display("abc", 3), "abc");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_display("abcdef", 4), "abc…");
        assert_eq!(truncate_display("abcdef", 1), "…");
        assert_eq!(truncate_display("abcdef", 0), "");
    }

    #[test]
    fn truncate_cjk_boundary() {
        // "世界你好" is 8 columns; budget 3 fits one wide char + ellipsis
        let t = truncate_display("世界你好", 4);
        assert_eq!(t, "世…");
        assert!(display_width(&t) <= 4);
    }

    #[test]
    fn pad_right_cases() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_right("abcde", 5), "abcde");
        assert_eq!(pad_right("abcdef", 4), "abc…");
        assert_eq!(display_width(&pad_right("世界你好", 4)), 4);
    }

    #[test]
    fn col_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(27), "AB");
        assert_eq!(col_to_letter(701), "ZZ");
    }
}
