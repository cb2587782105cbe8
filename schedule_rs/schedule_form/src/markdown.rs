//! The tiny Markdown subset used by analysis text: `**bold**` and newlines.

use std::sync::OnceLock;

use regex::Regex;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

/// Escapes the five HTML-significant characters. `&` goes first so entities
/// produced by later replacements are not escaped twice.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Converts analysis text to an HTML fragment: escape, then bold, then line breaks.
pub fn render_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let escaped = escape_html(text);
    let bolded = bold_pattern().replace_all(&escaped, "<strong>$1</strong>");
    bolded.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn escapes_before_bolding() {
        assert_eq!(
            render_markdown("<b>**ok**</b>\n"),
            "&lt;b&gt;<strong>ok</strong>&lt;/b&gt;<br>"
        );
    }

    #[test]
    fn escapes_all_five_characters_once() {
        assert_eq!(
            escape_html(r#"a & b < c > "d" 'e'"#),
            "a &amp; b &lt; c &gt; &quot;d&quot; &#039;e&#039;"
        );
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn bold_is_non_greedy() {
        assert_eq!(
            render_markdown("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn unpaired_markers_are_left_alone() {
        assert_eq!(render_markdown("5 ** 2"), "5 ** 2");
    }

    #[test]
    fn bold_does_not_span_lines() {
        assert_eq!(render_markdown("**a\nb**"), "**a<br>b**");
    }

    #[test]
    fn script_tags_never_survive() {
        let html = render_markdown("**<script>alert('x')</script>**");
        assert!(!html.contains("<script>"));
        assert!(html.starts_with("<strong>&lt;script&gt;"));
    }
}
