//! Request and response types for the question endpoint.

use serde::{Deserialize, Serialize};

/// Fallback answer text when the backend returns none.
const NO_RESPONSE: &str = "No response from server";

/// Body of `POST /v1/question`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRequest<'a> {
    /// The user's question.
    pub question: &'a str,
    /// Client identifier assigned by the backend, `null` on first contact.
    pub user_id: Option<&'a str>,
}

/// Answer as sent by the backend.
///
/// Every field is optional. Serde ignores unknown fields.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAnswer {
    #[serde(default)]
    pub response: Option<String>,
    /// Older backends sent the answer under a mistyped key.
    #[serde(rename = "response: ", default)]
    pub legacy_response: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub scenario_active: Option<bool>,
    #[serde(default)]
    pub scenario_name: Option<String>,
    #[serde(default)]
    pub scenario_completed: Option<bool>,
    #[serde(default)]
    pub source: Option<String>,
}

/// State of a guided scenario the backend may be running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioStatus {
    /// A scenario is in progress.
    pub active: bool,
    /// Scenario name, if any.
    pub name: Option<String>,
    /// The scenario finished with this answer.
    pub completed: bool,
}

/// Normalized answer to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    /// Answer text (markdown).
    pub response: String,
    /// Scenario state.
    pub scenario: ScenarioStatus,
    /// Where the answer came from (`rag` unless the backend says otherwise).
    pub source: String,
}

impl From<RawAnswer> for AskResponse {
    fn from(raw: RawAnswer) -> Self {
        let response = raw
            .response
            .filter(|r| !r.is_empty())
            .or(raw.legacy_response.filter(|r| !r.is_empty()))
            .unwrap_or_else(|| NO_RESPONSE.to_owned());

        Self {
            response,
            scenario: ScenarioStatus {
                active: raw.scenario_active.unwrap_or(false),
                name: raw.scenario_name.filter(|n| !n.is_empty()),
                completed: raw.scenario_completed.unwrap_or(false),
            },
            source: raw
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "rag".to_owned()),
        }
    }
}
