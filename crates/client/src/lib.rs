//! HTTP client for the Glean chat API.
//!
//! One bearer-authenticated POST per question; the JSON response is parsed
//! into answer text, research URLs, and citation URLs. No state is kept
//! between calls and no retries are attempted.

mod protocol;

use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use askglean_shared::{AnswerResponse, AskGleanError, Result, RunConfig};

use crate::protocol::{ChatRequest, ChatResponse};

/// Chat endpoint path on a Glean backend host.
const CHAT_ENDPOINT: &str = "/rest/api/v1/chat";

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("askglean/", env!("CARGO_PKG_VERSION"));

/// Header naming the user a request acts on behalf of.
const ACT_AS_HEADER: &str = "X-Scio-Actas";

// ---------------------------------------------------------------------------
// GleanClient
// ---------------------------------------------------------------------------

/// Client for the chat API of a named Glean instance.
pub struct GleanClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: String,
    user: Option<String>,
    app_id: Option<String>,
}

impl GleanClient {
    /// Build a client for the configured instance.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskGleanError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&format!("https://{}-be.glean.com", config.instance))
            .map_err(|e| {
                AskGleanError::config(format!("invalid instance name '{}': {e}", config.instance))
            })?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
            user: config.user.clone(),
            app_id: config.app_id.clone(),
        })
    }

    /// Point the client at a different backend host (self-hosted
    /// deployments, mock servers in tests).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Ask one question and parse the response.
    ///
    /// Exactly one outbound request per call. 401/403 map to [`AskGleanError::Auth`],
    /// any other non-2xx status or an unparseable body to
    /// [`AskGleanError::RemoteService`], and transport failures to
    /// [`AskGleanError::Network`].
    #[instrument(skip_all, fields(question_len = question.len()))]
    pub async fn chat(&self, question: &str) -> Result<AnswerResponse> {
        if question.trim().is_empty() {
            return Err(AskGleanError::RemoteService(
                "refusing to send an empty question".into(),
            ));
        }

        let url = self
            .base_url
            .join(CHAT_ENDPOINT)
            .map_err(|e| AskGleanError::config(format!("invalid endpoint URL: {e}")))?;
        let payload = ChatRequest::for_question(question, self.app_id.as_deref());

        debug!(%url, "sending chat request");

        let mut request = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_token)
            .json(&payload);

        if let Some(user) = &self.user {
            request = request.header(ACT_AS_HEADER, user);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AskGleanError::Network(format!("{url}: {e}")))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = response.text().await.unwrap_or_default();
            return Err(AskGleanError::Auth(format!("HTTP {status}: {body}")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AskGleanError::RemoteService(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AskGleanError::RemoteService(format!("malformed response body: {e}"))
        })?;

        Ok(body.into_answer())
    }
}
