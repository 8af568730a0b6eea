//! Blocking HTTP client for the ragchat question-answering backend.
//!
//! [`ApiClient`] posts questions to `{base}/v1/question`, keeps the
//! backend-assigned client identifier in a [`UserIdStore`], and retries
//! transport failures according to a [`RetryPolicy`].
//!
//! ```no_run
//! use ragchat_client::{ApiClient, ClientSettings, MemoryUserIdStore};
//!
//! let settings = ClientSettings::default();
//! let mut client = ApiClient::new("http://localhost:7000/api", &settings, MemoryUserIdStore::default())?;
//! let answer = client.ask_question("What documents do I need?")?;
//! println!("{}", answer.response);
//! # Ok::<(), ragchat_client::ClientError>(())
//! ```

mod client;
mod error;
mod retry;
mod types;
mod user_id;

pub use client::{ApiClient, ClientSettings};
pub use error::ClientError;
pub use retry::RetryPolicy;
pub use types::{AskResponse, QuestionRequest, ScenarioStatus};
pub use user_id::{FileUserIdStore, MemoryUserIdStore, UserIdStore};
