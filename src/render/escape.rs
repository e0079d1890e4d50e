//! Minimal escaping for markup built from stored field values.

/// Escape text for an HTML text context: `& < > " '`.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for a quoted attribute: `escape_html` plus the backtick.
pub fn escape_attr(value: &str) -> String {
    escape_html(value).replace('`', "&#096;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_the_five_characters() {
        assert_eq!(escape_html("<b>&'\""), "&lt;b&gt;&amp;&#039;&quot;");
    }

    #[test]
    fn attr_also_escapes_backtick() {
        assert_eq!(escape_attr("`"), "&#096;");
        assert_eq!(escape_attr("a`<"), "a&#096;&lt;");
    }

    #[test]
    fn html_leaves_backtick_alone() {
        assert_eq!(escape_html("`x`"), "`x`");
    }

    #[test]
    fn ampersand_is_not_double_escaped_in_one_pass() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_html("Hôpital Saint-Louis"), "Hôpital Saint-Louis");
        assert_eq!(escape_attr(""), "");
    }
}
