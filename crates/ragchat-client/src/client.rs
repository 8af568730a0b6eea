//! Question and health requests.

use std::io;
use std::time::{Duration, Instant};

use ragchat_config::ApiConfig;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::error::ClientError;
use crate::retry::RetryPolicy;
use crate::types::{AskResponse, QuestionRequest, RawAnswer};
use crate::user_id::UserIdStore;

/// Characters of an error response body kept in [`ClientError::HttpStatus`].
const ERROR_BODY_LIMIT: usize = 200;

/// Timeouts and retry behavior of an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Timeout for question requests.
    pub timeout: Duration,
    /// Timeout for health checks.
    pub health_timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&ApiConfig> for ClientSettings {
    fn from(api: &ApiConfig) -> Self {
        Self {
            timeout: api.timeout(),
            health_timeout: api.health_timeout(),
            retry: RetryPolicy {
                max_retries: api.max_retries,
                delay: api.retry_delay(),
            },
        }
    }
}

/// Client for the question-answering backend.
pub struct ApiClient<S> {
    agent: Agent,
    health_agent: Agent,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    store: S,
    user_id: Option<String>,
}

impl<S: UserIdStore> ApiClient<S> {
    /// Create a client for `base_url` and load the stored client identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UserIdStore`] if the identifier cannot be read.
    pub fn new(base_url: &str, settings: &ClientSettings, store: S) -> Result<Self, ClientError> {
        let user_id = store.load()?;
        debug!(base_url, has_user_id = user_id.is_some(), "Created API client");

        Ok(Self {
            agent: build_agent(settings.timeout),
            health_agent: build_agent(settings.health_timeout),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: settings.timeout,
            retry: settings.retry,
            store,
            user_id,
        })
    }

    /// Create a client from the API section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UserIdStore`] if the identifier cannot be read.
    pub fn from_config(api: &ApiConfig, store: S) -> Result<Self, ClientError> {
        Self::new(&api.resolved_base_url(), &ClientSettings::from(api), store)
    }

    /// Backend base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current client identifier.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The identifier store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Send a question and return the normalized answer.
    ///
    /// A `user_id` in the answer that differs from the current one replaces
    /// it and is persisted.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] if the backend does not answer in time
    /// - [`ClientError::Network`] if transport failures outlast the retries
    /// - [`ClientError::HttpStatus`] if the backend returns an error status
    /// - [`ClientError::Json`] if the answer is not valid JSON
    pub fn ask_question(&mut self, question: &str) -> Result<AskResponse, ClientError> {
        let url = format!("{}/v1/question", self.base_url);
        let body = serde_json::to_string(&QuestionRequest {
            question,
            user_id: self.user_id.as_deref(),
        })?;

        let raw = self.retry.run(|attempt| {
            info!(url = %url, attempt, "Sending question");
            let start = Instant::now();

            let response = self
                .agent
                .post(&url)
                .header("Content-Type", "application/json")
                .header("Cache-Control", "no-cache")
                .send(body.as_bytes())
                .map_err(|e| self.transport_error(e))?;

            let status = response.status().as_u16();
            let text = response
                .into_body()
                .read_to_string()
                .map_err(|e| self.body_error(e))?;
            debug!(status, elapsed_ms = start.elapsed().as_millis(), "Received response");

            if status >= 400 {
                return Err(ClientError::HttpStatus {
                    status,
                    body: text.chars().take(ERROR_BODY_LIMIT).collect(),
                });
            }

            Ok(serde_json::from_str::<RawAnswer>(&text)?)
        })?;

        if let Some(user_id) = raw.user_id.as_deref().filter(|id| !id.is_empty()) {
            self.remember_user_id(user_id);
        }

        Ok(raw.into())
    }

    /// Check whether the backend is reachable and healthy.
    ///
    /// Returns `true` on a 2xx answer from `{base}/health`. Any failure,
    /// including a timeout, yields `false`.
    pub fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.health_agent.get(&url).call() {
            Ok(response) => {
                let healthy = response.status().is_success();
                debug!(url = %url, status = response.status().as_u16(), healthy, "Health check");
                healthy
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Health check failed");
                false
            }
        }
    }

    /// Forget the client identifier so the next question starts a new session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UserIdStore`] if the stored identifier cannot be removed.
    pub fn clear_session(&mut self) -> Result<(), ClientError> {
        self.store.clear()?;
        self.user_id = None;
        info!("Cleared client session");
        Ok(())
    }

    fn remember_user_id(&mut self, user_id: &str) {
        if self.user_id.as_deref() == Some(user_id) {
            return;
        }
        info!(user_id, "Backend assigned client identifier");
        if let Err(e) = self.store.save(user_id) {
            warn!(error = %e, "Failed to persist client identifier");
        }
        self.user_id = Some(user_id.to_owned());
    }

    /// Classify a transport error as timeout or retryable network failure.
    fn transport_error(&self, error: ureq::Error) -> ClientError {
        match error {
            ureq::Error::Timeout(_) => ClientError::Timeout(self.timeout),
            ureq::Error::Io(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                ClientError::Timeout(self.timeout)
            }
            other => ClientError::Network {
                attempts: 1,
                message: other.to_string(),
            },
        }
    }

    /// Classify an error raised after the request was sent. Only a timeout
    /// keeps its own kind; nothing here is retried.
    fn body_error(&self, error: ureq::Error) -> ClientError {
        match self.transport_error(error) {
            ClientError::Network { message, .. } => ClientError::ResponseBody(message),
            other => other,
        }
    }
}

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_id::MemoryUserIdStore;
    use pretty_assertions::assert_eq;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    /// Serve one canned HTTP response and hand back the raw request.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (format!("http://{addr}/api"), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map_or(0, |v| v.trim().parse::<usize>().unwrap());
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn settings(timeout: Duration) -> ClientSettings {
        ClientSettings {
            timeout,
            health_timeout: timeout,
            retry: RetryPolicy {
                max_retries: 2,
                delay: Duration::ZERO,
            },
        }
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/api")
    }

    #[test]
    fn test_ask_question_sends_request_and_parses_answer() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"response": "Bring your **passport**", "user_id": "u-42", "source": "rag"}"#,
        );
        let mut client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();

        let answer = client.ask_question("What do I need?").unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("POST /api/v1/question "));
        let lowered = request.to_lowercase();
        assert!(lowered.contains("content-type: application/json"));
        assert!(lowered.contains("cache-control: no-cache"));
        assert!(request.contains(r#"{"question":"What do I need?","user_id":null}"#));

        assert_eq!(answer.response, "Bring your **passport**");
        assert_eq!(answer.source, "rag");
        assert_eq!(client.user_id(), Some("u-42"));
        assert_eq!(client.store().load().unwrap().as_deref(), Some("u-42"));
    }

    #[test]
    fn test_ask_question_sends_stored_user_id() {
        let (url, server) = serve_once("200 OK", r#"{"response": "ok"}"#);
        let mut client = ApiClient::new(
            &url,
            &settings(Duration::from_secs(5)),
            MemoryUserIdStore::with_user_id("known"),
        )
        .unwrap();

        client.ask_question("Hi").unwrap();
        let request = server.join().unwrap();

        assert!(request.contains(r#""user_id":"known""#));
        assert_eq!(client.user_id(), Some("known"));
    }

    #[test]
    fn test_http_error_truncates_body() {
        let long_body: &'static str = Box::leak("x".repeat(500).into_boxed_str());
        let (url, server) = serve_once("500 Internal Server Error", long_body);
        let mut client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();

        let err = client.ask_question("Hi").unwrap_err();
        server.join().unwrap();

        match err {
            ClientError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 200);
            }
            other => panic!("expected HTTP status error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_answer() {
        let (url, server) = serve_once("200 OK", "not json");
        let mut client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();

        let err = client.ask_question("Hi").unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn test_truncated_response_is_not_retried() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"resp")
                .unwrap();
            // Stay up so a resent request would reach this listener
            listener.set_nonblocking(true).unwrap();
            drop(stream);
            thread::sleep(Duration::from_millis(500));
            listener.accept().is_ok()
        });

        let mut client = ApiClient::new(
            &format!("http://{addr}/api"),
            &settings(Duration::from_secs(5)),
            MemoryUserIdStore::default(),
        )
        .unwrap();

        let err = client.ask_question("Hi").unwrap_err();
        let resent = server.join().unwrap();

        assert!(matches!(err, ClientError::ResponseBody(_)), "got {err:?}");
        assert!(!resent);
    }

    #[test]
    fn test_connection_refused_is_retried() {
        let url = closed_port_url();
        let mut client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();

        let err = client.ask_question("Hi").unwrap_err();

        assert!(
            matches!(err, ClientError::Network { attempts: 3, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_timeout_is_reported_separately() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
            thread::sleep(Duration::from_secs(2));
        });

        let mut client = ApiClient::new(
            &format!("http://{addr}/api"),
            &settings(Duration::from_millis(300)),
            MemoryUserIdStore::default(),
        )
        .unwrap();

        let err = client.ask_question("Hi").unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)), "got {err:?}");
    }

    #[test]
    fn test_check_health() {
        let (url, server) = serve_once("200 OK", r#"{"status": "ok"}"#);
        let client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();
        assert!(client.check_health());
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/health "));

        let (url, server) = serve_once("503 Service Unavailable", "");
        let client =
            ApiClient::new(&url, &settings(Duration::from_secs(5)), MemoryUserIdStore::default())
                .unwrap();
        assert!(!client.check_health());
        server.join().unwrap();
    }

    #[test]
    fn test_check_health_unreachable() {
        let client = ApiClient::new(
            &closed_port_url(),
            &settings(Duration::from_secs(1)),
            MemoryUserIdStore::default(),
        )
        .unwrap();
        assert!(!client.check_health());
    }

    #[test]
    fn test_clear_session() {
        let mut client = ApiClient::new(
            "http://localhost:7000/api/",
            &ClientSettings::default(),
            MemoryUserIdStore::with_user_id("old"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:7000/api");
        assert_eq!(client.user_id(), Some("old"));

        client.clear_session().unwrap();

        assert_eq!(client.user_id(), None);
        assert_eq!(client.store().load().unwrap(), None);
    }

    #[test]
    fn test_settings_from_config() {
        let api = ApiConfig {
            timeout_secs: 30,
            max_retries: 4,
            retry_delay_ms: 50,
            health_timeout_secs: 2,
            ..Default::default()
        };
        let settings = ClientSettings::from(&api);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.health_timeout, Duration::from_secs(2));
        assert_eq!(
            settings.retry,
            RetryPolicy {
                max_retries: 4,
                delay: Duration::from_millis(50),
            }
        );
    }
}
