//! Nextcloud Talk client.
//!
//! Posts messages into a Talk chat via the OCS API:
//! `POST {base}/ocs/v2.php/apps/spreed/api/v1/chat/{chat}` with HTTP Basic
//! auth and the `OCS-APIRequest` header. One-shot requests only — no retries,
//! no session state.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

/// Path segments of the Talk chat endpoint, appended to the base URL.
const CHAT_ENDPOINT: [&str; 7] = ["ocs", "v2.php", "apps", "spreed", "api", "v1", "chat"];

/// Failure while building the client or sending a message.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The configured server URL does not parse.
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    /// The configured server URL cannot carry the chat endpoint path.
    #[error("server url cannot be a base for the chat endpoint")]
    BaseUrl,

    /// The message payload failed to serialize. Effectively unreachable for
    /// the fixed two-field payload, but surfaced rather than panicked.
    #[error("encode message payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// Network, TLS, or timeout failure from the transport.
    #[error("send chat message: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error(
        "nextcloud talk request failed with status {status}{}",
        .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default()
    )]
    Status {
        status: StatusCode,
        body: Option<String>,
    },
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    token: &'a str,
    message: &'a str,
}

/// Sends messages to Nextcloud Talk.
///
/// Immutable after construction and safe to share across tasks; every
/// [`Client::send_message`] call is an independent request.
pub struct Client {
    base: Url,
    username: String,
    password: String,
    http: reqwest::Client,
}

impl Client {
    /// Starts building a client for the given server and credentials.
    pub fn builder(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            http: None,
            insecure: false,
            timeout: None,
        }
    }

    /// Posts a message into the given chat.
    ///
    /// The chat ID travels percent-encoded in the URL path and unescaped in
    /// the JSON body. Statuses in [200, 300) are success; anything else is
    /// reported as [`SendError::Status`] with the response body when it can
    /// be read. Cancellation is the caller's: dropping the returned future
    /// aborts the in-flight request.
    pub async fn send_message(&self, chat_id: &str, message: &str) -> Result<(), SendError> {
        let payload = serde_json::to_vec(&ChatMessage {
            token: chat_id,
            message,
        })
        .map_err(SendError::Payload)?;

        let url = self.endpoint(chat_id)?;
        tracing::debug!(url = %url, "posting chat message");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("OCS-APIRequest", "true")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = %status, "message accepted");
            return Ok(());
        }

        // Best effort: a failure to read the body never hides the status.
        let body = response.text().await.ok();
        Err(SendError::Status { status, body })
    }

    fn endpoint(&self, chat_id: &str) -> Result<Url, SendError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| SendError::BaseUrl)?;
            segments.pop_if_empty();
            segments.extend(CHAT_ENDPOINT);
            segments.push(chat_id);
        }
        Ok(url)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
///
/// Options are applied in order on top of defaults; each is a no-op unless
/// set.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    username: String,
    password: String,
    http: Option<reqwest::Client>,
    insecure: bool,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Uses the given HTTP client instead of building a default one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Disables TLS certificate verification, for self-signed deployments.
    ///
    /// When set, the transport is rebuilt to accept any server certificate;
    /// all other transport settings stay at their defaults.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Sets an overall deadline on each request made by the default
    /// transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the base URL and constructs the transport.
    ///
    /// Trailing slashes on the base URL are stripped here, once, so endpoint
    /// construction never produces a double separator.
    pub fn build(self) -> Result<Client, SendError> {
        let base = Url::parse(self.base_url.trim_end_matches('/'))?;
        if base.cannot_be_a_base() {
            return Err(SendError::BaseUrl);
        }

        let http = match (self.insecure, self.http) {
            // The insecure toggle swaps the transport for one that accepts
            // any certificate, so a supplied client cannot be reused here.
            (true, _) => {
                let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(true);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
            (false, Some(http)) => http,
            (false, None) => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(Client {
            base,
            username: self.username,
            password: self.password,
            http,
        })
    }
}
