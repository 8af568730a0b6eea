//! Line-level block substitutions: headings, horizontal rules, blockquotes.

use std::sync::LazyLock;

use regex::Regex;

static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.+)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^---$").unwrap());
// Input is escaped before this pass, so the quote marker arrives as `&gt; `.
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^&gt; (.+)$").unwrap());

/// Apply heading, rule and blockquote substitutions.
///
/// Headings are matched longest marker first so `### x` is never read as a
/// level-one heading. Every quoted line becomes its own `<blockquote>`.
pub(crate) fn render_blocks(text: &str) -> String {
    let html = H3.replace_all(text, "<h3>$1</h3>");
    let html = H2.replace_all(&html, "<h2>$1</h2>");
    let html = H1.replace_all(&html, "<h1>$1</h1>");
    let html = RULE.replace_all(&html, "<hr>");
    QUOTE
        .replace_all(&html, "<blockquote>$1</blockquote>")
        .into_owned()
}
