//! HTTP client wrapper for the Argus API.
//!
//! All endpoints are POST with JSON bodies and a `Token-Signature` header.
//! The recording endpoint answers with either a binary audio body or a JSON
//! error envelope, so its helper returns a two-armed [`RecordingResponse`].

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::ApiError;
use super::types::{CallsPageResponse, ErrorEnvelope, SkillsResponse};

/// Campaign-catalog endpoint.
pub(crate) const SKILLS_ENDPOINT: &str = "/cmd/skills";

/// Call-listing endpoint.
pub(crate) const CALLS_ENDPOINT: &str = "/report/ligacoesdetalhadas";

/// Recording-fetch endpoint.
pub(crate) const RECORDING_ENDPOINT: &str = "/cmd/downloadgravacao";

/// Default HTTP connect timeout (30 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (2 minutes; recordings are single-shot bodies).
const READ_TIMEOUT_SECS: u64 = 120;

/// Recording format requested from the API.
const RECORDING_FORMAT: &str = "MP3";

/// Result of one recording fetch: audio bytes or the API's error envelope.
#[derive(Debug, Clone)]
pub enum RecordingResponse {
    /// The response body is the recording itself.
    Audio(Vec<u8>),
    /// The response is a JSON envelope describing why there is no audio.
    Envelope(ErrorEnvelope),
}

/// HTTP client for the Argus API.
///
/// Designed to be created once and shared across workers, taking advantage
/// of connection pooling. The base URL is configurable so tests can point it
/// at a mock server.
#[derive(Debug, Clone)]
pub struct ArgusClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ArgusClient {
    /// Creates a new client for `base_url` authenticating with `token`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            "Token-Signature",
            HeaderValue::from_str(&token)
                .expect("API token contains characters invalid in an HTTP header"),
        );

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// The configured base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured token (needed verbatim for failure diagnostics).
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fetches the campaign catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success HTTP status,
    /// or an undecodable body. Application-level status codes are returned
    /// inside the response for the caller to inspect.
    #[instrument(skip(self))]
    pub async fn fetch_skills(&self) -> Result<SkillsResponse, ApiError> {
        self.post_json(SKILLS_ENDPOINT, &json!({})).await
    }

    /// Fetches one page of call records for a campaign and period.
    ///
    /// `ultimo_id` is the pagination cursor; `0` requests the first page.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`fetch_skills`](Self::fetch_skills).
    #[instrument(skip(self, period_start, period_end))]
    pub async fn fetch_calls_page(
        &self,
        campaign_id: i64,
        period_start: &str,
        period_end: &str,
        ultimo_id: i64,
    ) -> Result<CallsPageResponse, ApiError> {
        let body = json!({
            "idCampanha": campaign_id,
            "periodoInicial": period_start,
            "periodoFinal": period_end,
            "ultimoId": ultimo_id,
        });
        self.post_json(CALLS_ENDPOINT, &body).await
    }

    /// Fetches one call's recording.
    ///
    /// A body with an audio content type is returned as
    /// [`RecordingResponse::Audio`]; anything else is parsed as the API's
    /// JSON error envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrives,
    /// [`ApiError::Http`] on a non-success status, and [`ApiError::Decode`]
    /// when a non-audio body is not a valid envelope.
    #[instrument(skip(self))]
    pub async fn fetch_recording(
        &self,
        campaign_id: i64,
        call_id: i64,
    ) -> Result<RecordingResponse, ApiError> {
        let body = json!({
            "idCampanha": campaign_id,
            "idLigacao": call_id,
            "formato": RECORDING_FORMAT,
        });

        let response = self
            .client
            .post(format!("{}{RECORDING_ENDPOINT}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::network(RECORDING_ENDPOINT, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http(RECORDING_ENDPOINT, status.as_u16()));
        }

        let is_audio = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("audio"));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(RECORDING_ENDPOINT, e))?;

        if is_audio {
            debug!(call_id, bytes = bytes.len(), "received audio body");
            return Ok(RecordingResponse::Audio(bytes.to_vec()));
        }

        let envelope: ErrorEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::decode(RECORDING_ENDPOINT, e))?;
        debug!(
            call_id,
            cod_status = envelope.cod_status,
            "received error envelope instead of audio"
        );
        Ok(RecordingResponse::Envelope(envelope))
    }

    /// POSTs a JSON body and decodes a JSON response.
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(format!("{}{endpoint}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::network(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http(endpoint, status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(endpoint, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(endpoint, e))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash_from_base_url() {
        let client = ArgusClient::new("https://argus.app.br/apiargus/", "tok");
        assert_eq!(client.base_url(), "https://argus.app.br/apiargus");
    }

    #[test]
    fn test_client_exposes_token_for_diagnostics() {
        let client = ArgusClient::new("https://argus.app.br/apiargus", "secret-token");
        assert_eq!(client.token(), "secret-token");
    }
}
