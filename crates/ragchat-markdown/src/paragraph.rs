//! Paragraph and line-break normalization, document wrapping and cleanup.

use std::sync::LazyLock;

use regex::Regex;

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:h[1-6]|div|p|ul|ol|blockquote|pre|hr|table)[\s>]").unwrap()
});
static BLOCK_OPEN_AT_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(h[1-6]|div|ul|ol|blockquote|pre|table)[\s>]").unwrap()
});
static PARAGRAPH_OR_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?p>|<(?:h[1-6]|div|ul|ol|blockquote|pre|table)[\s>]|<hr>").unwrap()
});
static BREAK_BEFORE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<br>)+(<(?:h[1-6]|div|ul|ol|blockquote|pre|hr|table)[\s>])").unwrap()
});
static BREAK_AFTER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(</(?:h[1-6]|div|ul|ol|blockquote|pre|table)>|<hr>)(?:<br>)+").unwrap()
});
static BREAK_AFTER_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p>(?:<br>)+").unwrap());
static BREAK_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:<br>)+</p>").unwrap());
static EMPTY_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p>\s*</p>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Blank lines become paragraph boundaries, single newlines become `<br>`.
pub(crate) fn normalize_breaks(text: &str) -> String {
    text.replace("\n\n", "</p><p>").replace('\n', "<br>")
}

/// Wrap the document in paragraphs.
///
/// Without any block-level tag the whole text becomes one `<p>`. Otherwise
/// leading bare text opens a paragraph and the `<p>`/`</p>` tags produced by
/// [`normalize_breaks`] are balanced.
pub(crate) fn wrap_document(html: &str) -> String {
    if !BLOCK_TAG.is_match(html) {
        return format!("<p>{html}</p>");
    }

    if html.starts_with('<') {
        balance_paragraphs(html)
    } else {
        balance_paragraphs(&format!("<p>{html}"))
    }
}

/// Drop stray `</p>`, close a `<p>` left open before the next one or before
/// a block element, and close a trailing open paragraph.
///
/// A paragraph closed by a block is not reopened after it.
fn balance_paragraphs(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 8);
    let mut open = false;
    let mut last = 0;

    for tag in PARAGRAPH_OR_BLOCK.find_iter(html) {
        out.push_str(&html[last..tag.start()]);
        last = tag.end();

        match tag.as_str() {
            "<p>" => {
                if open {
                    out.push_str("</p>");
                }
                out.push_str("<p>");
                open = true;
            }
            "</p>" => {
                if open {
                    out.push_str("</p>");
                    open = false;
                }
            }
            block => {
                if open {
                    out.push_str("</p>");
                    open = false;
                }
                out.push_str(block);
            }
        }
    }

    out.push_str(&html[last..]);
    if open {
        out.push_str("</p>");
    }
    out
}

/// Final cleanup.
///
/// Moves block elements out of the front of paragraphs, removes line breaks
/// that touch paragraph or block boundaries, drops empty paragraphs,
/// collapses whitespace and trims.
pub(crate) fn cleanup(html: &str) -> String {
    let html = hoist_leading_blocks(html);
    let html = BREAK_BEFORE_BLOCK.replace_all(&html, "$1");
    let html = BREAK_AFTER_BLOCK.replace_all(&html, "$1");
    let html = BREAK_AFTER_OPEN.replace_all(&html, "<p>");
    let html = BREAK_BEFORE_CLOSE.replace_all(&html, "</p>");
    let html = EMPTY_PARAGRAPH.replace_all(&html, "");
    let html = WHITESPACE.replace_all(&html, " ");
    html.trim().to_owned()
}

/// Rewrite `<p><h1>..</h1>rest` as `<h1>..</h1><p>rest`.
fn hoist_leading_blocks(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find("<p>") {
        out.push_str(&rest[..pos]);
        let mut after = &rest[pos + 3..];
        while let Some(end) = leading_block_len(after) {
            out.push_str(&after[..end]);
            after = &after[end..];
        }
        out.push_str("<p>");
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Length of the block element at the very start of `s`, if there is one.
fn leading_block_len(s: &str) -> Option<usize> {
    if s.starts_with("<hr>") {
        return Some("<hr>".len());
    }
    let name = BLOCK_OPEN_AT_START.captures(s)?.get(1)?.as_str();
    let close = format!("</{name}>");
    s.find(&close).map(|i| i + close.len())
}
