//! List item extraction and grouping.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[*-] (.+)$").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\. (.+)$").unwrap());
static ITEM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<li>.*?</li>(?:\s*<li>.*?</li>)*").unwrap());
static ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<li>.*?</li>").unwrap());

/// Turn `* `, `- ` and `N. ` lines into `<li>` and group each run into a `<ul>`.
///
/// Numbered and bulleted items render the same way. Items separated only by
/// whitespace share one list; any other content in between starts a new one.
pub(crate) fn render_lists(text: &str) -> String {
    let html = BULLET_ITEM.replace_all(text, "<li>$1</li>");
    let html = NUMBERED_ITEM.replace_all(&html, "<li>$1</li>");
    wrap_list_runs(&html)
}

/// Wrap every maximal run of `<li>` elements in `<ul>`, dropping the
/// whitespace between items.
fn wrap_list_runs(html: &str) -> String {
    ITEM_RUN
        .replace_all(html, |caps: &Captures| {
            let mut list = String::from("<ul>");
            for item in ITEM.find_iter(&caps[0]) {
                list.push_str(item.as_str());
            }
            list.push_str("</ul>");
            list
        })
        .into_owned()
}
