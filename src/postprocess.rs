//! OCR result post-processing
//!
//! Raw engine text is cleaned once, stored with line-break markers, and split
//! back into plain segments for display, copy and download.

/// Marker that stands for a line break in cleaned text
pub const LINE_BREAK: &str = "<br />";

/// Characters replaced with a space. Cosmetic and lossy.
pub const NOISE: [char; 5] = ['=', ',', '\u{2014}', '-', '+'];

/// Replace newlines with [`LINE_BREAK`] and noise characters with spaces
pub fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\n' => out.push_str(LINE_BREAK),
            c if NOISE.contains(&c) => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Split cleaned text into its lines
pub fn segments(cleaned: &str) -> Vec<&str> {
    cleaned.split(LINE_BREAK).collect()
}

/// Plain text shown to the user, copied and downloaded
pub fn display_text(cleaned: &str) -> String {
    segments(cleaned).join("\n")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render cleaned text as HTML: escaped segments joined by [`LINE_BREAK`]
pub fn render_html(cleaned: &str) -> String {
    segments(cleaned)
        .into_iter()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_becomes_marker() {
        assert_eq!(clean("Hello\nWorld"), "Hello<br />World");
        assert_eq!(clean("\n\n"), "<br /><br />");
    }

    #[test]
    fn test_noise_becomes_space() {
        assert_eq!(clean("a=b,c\u{2014}d-e+f"), "a b c d e f");
    }

    #[test]
    fn test_other_text_untouched() {
        let raw = "Total: 42.50 EUR (incl. tax) #1 & <ok>";
        assert_eq!(clean(raw), raw);
    }

    #[test]
    fn test_clean_is_idempotent() {
        for raw in ["", "plain", "x=1\ny-2\n", "\u{2014}\n+,\n", "a<br />b"] {
            let once = clean(raw);
            assert_eq!(clean(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_segments_and_display_text() {
        let cleaned = clean("first line\nsecond, line\n");
        assert_eq!(segments(&cleaned), vec!["first line", "second  line", ""]);
        assert_eq!(display_text(&cleaned), "first line\nsecond  line\n");
    }

    #[test]
    fn test_display_text_without_breaks() {
        assert_eq!(display_text("single"), "single");
        assert_eq!(display_text(""), "");
    }

    #[test]
    fn test_render_html_escapes_text_nodes() {
        let cleaned = clean("<script>alert(1)</script>\nfish & chips");
        assert_eq!(
            render_html(&cleaned),
            "&lt;script&gt;alert(1)&lt;/script&gt;<br />fish &amp; chips"
        );
    }
}
