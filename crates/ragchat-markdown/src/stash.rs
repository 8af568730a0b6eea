//! Code stash: keeps code content out of reach of the text passes.
//!
//! Fenced blocks and inline code spans are rendered up front. Their tags stay
//! in the text, but their (already escaped) content is swapped for an opaque
//! placeholder and written back only after cleanup. This keeps heading, list,
//! emphasis and whitespace rules from rewriting code.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Opens a placeholder. Private-use code point, never produced by escaping.
const OPEN: char = '\u{E000}';
/// Closes a placeholder.
const CLOSE: char = '\u{E001}';

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.+?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").unwrap());
static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+#.-]+$").unwrap());

/// Collected code content, indexed by placeholder number.
#[derive(Debug, Default)]
pub(crate) struct CodeStash {
    items: Vec<String>,
}

impl CodeStash {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Render fenced blocks, then inline code, replacing their content with placeholders.
    ///
    /// Fences are matched first so a triple backtick is never read as three
    /// inline code delimiters.
    pub(crate) fn extract(&mut self, text: &str) -> String {
        // Stray sentinels in the source would alias real placeholders.
        let text: String = text.chars().filter(|&c| c != OPEN && c != CLOSE).collect();

        let text = FENCE.replace_all(&text, |caps: &Captures| {
            let (lang, body) = split_fence_info(&caps[1]);
            let placeholder = self.hold(body);
            match lang {
                Some(lang) => {
                    format!(r#"<pre><code class="language-{lang}">{placeholder}</code></pre>"#)
                }
                None => format!("<pre><code>{placeholder}</code></pre>"),
            }
        });

        INLINE_CODE
            .replace_all(&text, |caps: &Captures| {
                let placeholder = self.hold(&caps[1]);
                format!("<code>{placeholder}</code>")
            })
            .into_owned()
    }

    /// Write held content back in place of its placeholders.
    pub(crate) fn restore(&self, html: &str) -> String {
        if self.items.is_empty() {
            return html.to_owned();
        }
        PLACEHOLDER
            .replace_all(html, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.items.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Hold `content` and return its placeholder.
    pub(crate) fn hold(&mut self, content: &str) -> String {
        let idx = self.items.len();
        self.items.push(content.to_owned());
        format!("{OPEN}{idx}{CLOSE}")
    }
}

/// Split a fence body into an optional language word and the code itself.
///
/// The language is the whole first line when it is a single identifier-like
/// word followed by a newline. One leading and one trailing newline are
/// dropped from the code.
fn split_fence_info(body: &str) -> (Option<&str>, &str) {
    let (lang, code) = match body.split_once('\n') {
        Some((first, rest)) if LANGUAGE.is_match(first) => (Some(first), rest),
        _ => (None, body),
    };
    let code = code.strip_prefix('\n').unwrap_or(code);
    let code = code.strip_suffix('\n').unwrap_or(code);
    (lang, code)
}
