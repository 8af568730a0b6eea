//! The rendering pipeline.

use tracing::trace;

use crate::stash::CodeStash;
use crate::{block, escape, inline, list, paragraph, table};

/// Stateless markdown renderer.
///
/// Holds no state between calls and is safe to use from any number of
/// threads at once.
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Render markdown to an HTML fragment.
    ///
    /// Empty input renders to an empty string. Rendering never fails:
    /// malformed markup degrades to literal text. Source text is escaped
    /// before any tag is generated, so HTML in the input (including output of
    /// an earlier render) comes back escaped, never interpreted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat_markdown::MarkdownRenderer;
    ///
    /// assert_eq!(MarkdownRenderer::render("hello\nworld"), "<p>hello<br>world</p>");
    /// assert_eq!(MarkdownRenderer::render(""), "");
    /// ```
    pub fn render(markdown: &str) -> String {
        if markdown.is_empty() {
            return String::new();
        }

        let text = markdown.replace("\r\n", "\n");
        let escaped = escape::escape_html(&text);

        let mut stash = CodeStash::new();
        let html = stash.extract(&escaped);
        let html = block::render_blocks(&html);
        let html = inline::render_inline(&html, &mut stash);
        let html = list::render_lists(&html);
        let html = table::render_tables(&html);
        let html = paragraph::normalize_breaks(&html);
        let html = paragraph::wrap_document(&html);
        let html = paragraph::cleanup(&html);
        let html = stash.restore(&html);

        trace!(
            input_len = markdown.len(),
            output_len = html.len(),
            stashed = stash.len(),
            "Rendered markdown"
        );
        html
    }

    /// Render optional markdown; `None` renders to an empty string.
    pub fn render_opt(markdown: Option<&str>) -> String {
        markdown.map(Self::render).unwrap_or_default()
    }

    /// Render markdown inside a container element.
    ///
    /// Non-empty content gets the `markdown-content` class. Empty content
    /// yields a bare empty element. Tag names that are not plain ASCII
    /// alphanumerics fall back to `div`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat_markdown::MarkdownRenderer;
    ///
    /// assert_eq!(
    ///     MarkdownRenderer::render_element("*hi*", "section"),
    ///     r#"<section class="markdown-content"><p><em>hi</em></p></section>"#
    /// );
    /// assert_eq!(MarkdownRenderer::render_element("", "div"), "<div></div>");
    /// ```
    pub fn render_element(markdown: &str, tag: &str) -> String {
        let tag = if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            tag
        } else {
            "div"
        };

        if markdown.is_empty() {
            return format!("<{tag}></{tag}>");
        }
        format!(
            r#"<{tag} class="markdown-content">{}</{tag}>"#,
            Self::render(markdown)
        )
    }
}

/// Render markdown to an HTML fragment. Shorthand for [`MarkdownRenderer::render`].
pub fn render(markdown: &str) -> String {
    MarkdownRenderer::render(markdown)
}
