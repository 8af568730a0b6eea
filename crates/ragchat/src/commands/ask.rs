//! `ragchat ask` command implementation.

use clap::Args;
use ragchat_client::{ApiClient, AskResponse, FileUserIdStore};
use ragchat_config::Config;

use super::ApiArgs;
use crate::error::CliError;
use crate::output::{NotificationKind, Output};
use crate::transcript::{self, Transcript};

/// Arguments for the ask command.
#[derive(Args)]
pub(crate) struct AskArgs {
    /// The question to ask.
    question: String,

    /// Print the conversation as chat HTML instead of the raw answer.
    #[arg(long)]
    html: bool,

    /// Forget the stored client identifier and start a new session.
    #[arg(long)]
    new_session: bool,

    #[command(flatten)]
    api: ApiArgs,
}

impl AskArgs {
    /// Execute the ask command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the request fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.api.load_config()?;

        let store = FileUserIdStore::new(&config.client_resolved.user_id_file);
        let mut client = ApiClient::from_config(&config.api, store)?;

        if self.new_session {
            client.clear_session()?;
            output.info("Started a new session");
        }

        let question = self.question.trim();
        if question.is_empty() {
            output.warning("Question is empty, nothing to send");
            return Ok(());
        }

        output.info(&format!("Asking {}...", client.base_url()));

        match client.ask_question(question) {
            Ok(answer) => {
                if answer.scenario.active && !answer.scenario.completed {
                    let name = answer.scenario.name.as_deref().unwrap_or("unnamed");
                    output.notify(NotificationKind::Info, &format!("Scenario in progress: {name}"));
                }
                let text = if self.html {
                    conversation_html(&config, question, &answer)
                } else {
                    answer.response
                };
                output.result(&text);
                Ok(())
            }
            Err(err) if self.html => {
                output.result(&failed_conversation_html(&config, question, &err.to_string()));
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn conversation_html(config: &Config, question: &str, answer: &AskResponse) -> String {
    let mut conversation = Transcript::with_welcome(&config.chat.welcome_message);
    conversation.push_user(question);
    conversation.push(transcript::render_answer(answer));
    conversation.to_html()
}

fn failed_conversation_html(config: &Config, question: &str, error: &str) -> String {
    let mut conversation = Transcript::with_welcome(&config.chat.welcome_message);
    conversation.push_user(question);
    conversation.push(transcript::error_message(error));
    format!(
        "{}{}",
        transcript::notification(NotificationKind::Error, "Failed to get an answer"),
        conversation.to_html()
    )
}
