//! HTML escaping.

/// Escape the five HTML-sensitive characters.
///
/// Only `&`, `<`, `>`, `"` and `'` are replaced; every other character is
/// copied through unchanged.
///
/// # Examples
///
/// ```
/// use ragchat_markdown::escape_html;
///
/// assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
/// assert_eq!(escape_html("it's"), "it&#x27;s");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
