//! Inline substitutions: bold, italic and links.
//!
//! Code spans are handled earlier by the stash, so nothing here sees code
//! content. Opening link tags go into the same stash before emphasis runs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::stash::CodeStash;

// Delimiters must hug non-whitespace, so `* item` list markers survive.
static BOLD_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap());
static BOLD_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^\s_](?:[^\n]*?[^\s_])?)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^\s_](?:[^_\n]*?[^\s_])?)_").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Apply link and emphasis substitutions in order: links, bold, italic.
///
/// Opening link tags are held in `stash` so emphasis markers inside a URL
/// stay literal; labels still get emphasis. Emphasis is plain sequential
/// substitution, not a nesting parser. Mixed input such as `*a**b**c*`
/// produces whatever the two passes yield.
pub(crate) fn render_inline(text: &str, stash: &mut CodeStash) -> String {
    let html = LINK.replace_all(text, |caps: &Captures| {
        let open = stash.hold(&format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
            &caps[2]
        ));
        format!("{open}{}</a>", &caps[1])
    });
    let html = wrap_delimited(&html, &BOLD_STAR, "strong", true);
    let html = wrap_delimited(&html, &BOLD_UNDERSCORE, "strong", false);
    let html = wrap_delimited(&html, &ITALIC_STAR, "em", true);
    wrap_delimited(&html, &ITALIC_UNDERSCORE, "em", false)
}

/// Wrap every match of `re` (group 1 is the content) in `<tag>`.
///
/// With `intraword` false, matches glued to a word character on either side
/// are left alone, so `snake_case_name` keeps its underscores.
fn wrap_delimited(text: &str, re: &Regex, tag: &str, intraword: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in re.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !intraword && touches_word(text, whole.start(), whole.end()) {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push('<');
        out.push_str(tag);
        out.push('>');
        out.push_str(inner.as_str());
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        last = whole.end();
    }

    out.push_str(&text[last..]);
    out
}

fn touches_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(is_word_char) || after.is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
