//! Markdown-to-HTML renderer for chat answers.
//!
//! This crate provides [`MarkdownRenderer`], a stateless renderer for the
//! small markdown dialect produced by the question-answering backend.
//!
//! # Pipeline
//!
//! Rendering is a fixed sequence of string-to-string passes:
//!
//! 1. Escape `&`, `<`, `>`, `"` and `'` so source text can never inject markup.
//! 2. Hold code spans and fenced blocks aside so later passes leave them alone.
//! 3. Headings, horizontal rules and blockquotes.
//! 4. Bold, italic and links.
//! 5. List items, grouped into one `<ul>` per contiguous run.
//! 6. Pipe tables with a separator row.
//! 7. Blank lines become paragraph breaks, single newlines become `<br>`.
//! 8. Paragraph wrapping, cleanup, and restoration of held code.
//!
//! Malformed input never fails: unmatched markers are left as literal text.
//!
//! # Example
//!
//! ```
//! use ragchat_markdown::MarkdownRenderer;
//!
//! let html = MarkdownRenderer::render("# Hello\n\n**Bold** text");
//! assert_eq!(html, "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
//! ```

mod block;
mod escape;
mod inline;
mod list;
mod paragraph;
mod renderer;
mod stash;
mod table;

pub use escape::escape_html;
pub use renderer::{MarkdownRenderer, render};
pub use table::Table;
