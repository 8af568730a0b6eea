//! HTML rendering of chat messages.
//!
//! Produces the same markup the web client builds: one
//! `<div class="message message--{role}">` per message with an avatar and a
//! content element. Assistant content is rendered from markdown, user
//! content is escaped.

use ragchat_client::{AskResponse, ScenarioStatus};
use ragchat_markdown::{MarkdownRenderer, escape_html};

use crate::output::NotificationKind;

/// Content element for escaped text.
const PLAIN_CONTENT: &str = "message__content";
/// Content element for rendered markdown.
const MARKDOWN_CONTENT: &str = "message__content markdown-content";

const LOADING_TEXT: &str = "Generating a detailed answer... (this may take up to 2 minutes)";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    User,
    Assistant,
}

impl Role {
    /// CSS modifier suffix.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Avatar text.
    pub(crate) fn avatar(self) -> &'static str {
        match self {
            Self::User => "",
            Self::Assistant => "AI",
        }
    }
}

/// Presentation flags of a message.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MessageOptions {
    pub(crate) welcome: bool,
    pub(crate) error: bool,
    pub(crate) loading: bool,
}

/// Normalize an answer before rendering.
///
/// Trims the text, collapses runs of blank lines into one and strips leading
/// indentation from every line.
pub(crate) fn format_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;

    for line in text.trim().lines() {
        let line = line.trim_start();
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }
    out
}

/// Render one message.
pub(crate) fn render_message(role: Role, content: &str, options: MessageOptions) -> String {
    let mut classes = format!("message message--{}", role.as_str());
    if options.welcome {
        classes.push_str(" message--welcome");
    }
    if options.error {
        classes.push_str(" message--error");
    }
    if options.loading {
        classes.push_str(" message--loading");
    }

    let (content_class, body) = if options.loading {
        (PLAIN_CONTENT, loading_content())
    } else if role == Role::Assistant && !content.is_empty() {
        (MARKDOWN_CONTENT, MarkdownRenderer::render(content))
    } else {
        (PLAIN_CONTENT, escape_html(content))
    };

    message_html(&classes, None, role, content_class, &body)
}

/// Render an answer, marking scenario state.
///
/// A completed scenario widens the message; an active one gets an indicator
/// naming the scenario.
pub(crate) fn render_answer(answer: &AskResponse) -> String {
    let ScenarioStatus {
        active,
        ref name,
        completed,
    } = answer.scenario;

    let mut classes = "message message--assistant".to_owned();
    if completed {
        classes.push_str(" message--scenario-completed");
    }

    let indicator = (active && !completed).then(|| {
        format!(
            r#"<div class="scenario-indicator">📋 Scenario: {}</div>"#,
            escape_html(name.as_deref().unwrap_or_default())
        )
    });

    let content = format_text(&answer.response);
    let body = MarkdownRenderer::render(&content);
    message_html(
        &classes,
        indicator.as_deref(),
        Role::Assistant,
        MARKDOWN_CONTENT,
        &body,
    )
}

/// Greeting shown at the start of a conversation.
pub(crate) fn welcome_message(text: &str) -> String {
    render_message(
        Role::Assistant,
        text,
        MessageOptions {
            welcome: true,
            ..Default::default()
        },
    )
}

/// Failure shown in place of an answer.
pub(crate) fn error_message(text: &str) -> String {
    render_message(
        Role::Assistant,
        text,
        MessageOptions {
            error: true,
            ..Default::default()
        },
    )
}

/// Placeholder shown while waiting for an answer.
pub(crate) fn loading_message() -> String {
    render_message(
        Role::Assistant,
        "",
        MessageOptions {
            loading: true,
            ..Default::default()
        },
    )
}

/// Notification banner coloured by kind.
pub(crate) fn notification(kind: NotificationKind, text: &str) -> String {
    format!(
        r#"<div class="notification" style="background-color: {}">{}</div>"#,
        kind.color_hex(),
        escape_html(text)
    )
}

fn loading_content() -> String {
    format!(
        r#"<div class="typing-indicator"><div class="typing-indicator__dot"></div><div class="typing-indicator__dot"></div><div class="typing-indicator__dot"></div></div><span>{LOADING_TEXT}</span>"#
    )
}

fn message_html(
    classes: &str,
    indicator: Option<&str>,
    role: Role,
    content_class: &str,
    body: &str,
) -> String {
    format!(
        r#"<div class="{classes}">{}<div class="message__avatar">{}</div><div class="{content_class}">{body}</div></div>"#,
        indicator.unwrap_or_default(),
        role.avatar()
    )
}

/// An ordered list of rendered messages.
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    messages: Vec<String>,
}

impl Transcript {
    /// Start a transcript with the welcome message.
    pub(crate) fn with_welcome(text: &str) -> Self {
        Self {
            messages: vec![welcome_message(text)],
        }
    }

    /// Append rendered message HTML.
    pub(crate) fn push(&mut self, html: String) {
        self.messages.push(html);
    }

    /// Append a user message.
    pub(crate) fn push_user(&mut self, text: &str) {
        self.push(render_message(Role::User, text, MessageOptions::default()));
    }

    /// Whole transcript as one container element.
    pub(crate) fn to_html(&self) -> String {
        format!(r#"<div class="chat-messages">{}</div>"#, self.messages.concat())
    }
}
