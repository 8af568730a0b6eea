//! `ragchat render` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use ragchat_markdown::MarkdownRenderer;

use crate::error::CliError;
use crate::output::Output;
use crate::transcript::{self, MessageOptions, Role};

/// How to present the rendered markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MessageKind {
    User,
    Assistant,
    Welcome,
    Error,
    Loading,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    file: Option<PathBuf>,

    /// Wrap the output in a chat message of this kind.
    #[arg(long, value_enum, conflicts_with = "element")]
    message: Option<MessageKind>,

    /// Wrap the output in a `markdown-content` element with this tag name.
    #[arg(long)]
    element: Option<String>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let markdown = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        if markdown.trim().is_empty() {
            output.warning("Input is empty");
        }

        let html = match &self.element {
            Some(tag) => MarkdownRenderer::render_element(&markdown, tag),
            None => render(&markdown, self.message),
        };
        output.result(&html);
        Ok(())
    }
}

fn render(markdown: &str, kind: Option<MessageKind>) -> String {
    let Some(kind) = kind else {
        return MarkdownRenderer::render(markdown);
    };

    match kind {
        MessageKind::User => transcript::render_message(Role::User, markdown, MessageOptions::default()),
        MessageKind::Assistant => transcript::render_message(
            Role::Assistant,
            &transcript::format_text(markdown),
            MessageOptions::default(),
        ),
        MessageKind::Welcome => transcript::welcome_message(markdown),
        MessageKind::Error => transcript::error_message(markdown),
        MessageKind::Loading => transcript::loading_message(),
    }
}
