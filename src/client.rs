// src/client.rs
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::credentials::CredentialStore;
use crate::errors::{ClientError, Result};
use crate::models::{
    IntervalPredictRequest, OntologyTerm, OntologyTermsResponse, OutputTypeInfo,
    OutputTypesResponse, PredictResponse, ScoreResponse, ScoreVariantRequest,
    VariantPredictRequest,
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Transport failures (no response at all) are retried generously to ride
/// out a backend that is still starting; anything that produced an HTTP
/// response fails fast.
pub const MAX_NETWORK_RETRIES: u32 = 5;
pub const MAX_HTTP_RETRIES: u32 = 1;

const BACKOFF_BASE_MS: u64 = 1000;
const BACKOFF_CAP_MS: u64 = 10_000;

/// Exponential backoff: 1s, 2s, 4s, 8s, then capped at 10s.
pub fn retry_delay(retries_done: u32) -> Duration {
    let exp = retries_done.min(10);
    Duration::from_millis((BACKOFF_BASE_MS << exp).min(BACKOFF_CAP_MS))
}

pub fn retry_allowed(err: &ClientError, retries_done: u32) -> bool {
    match err {
        ClientError::Request(_) => retries_done < MAX_NETWORK_RETRIES,
        // a rejected key stays rejected; retrying would only re-clear the store
        ClientError::Unauthorized { .. } => false,
        ClientError::Api { .. } => retries_done < MAX_HTTP_RETRIES,
        _ => false,
    }
}

/// Pulls a human-readable message out of an error response body. The server
/// reports failures as `{"detail": ...}`; anything else falls back to the
/// raw body, then to a generic message.
pub fn extract_detail(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail") {
            if let Some(s) = detail.as_str() {
                return s.to_string();
            }
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

/// One shared transport for every server operation. Every outgoing request
/// passes through [`ApiClient::authorize`] (attach the stored credential)
/// and every response through [`ApiClient::inspect`] (drop the credential
/// on an authorization failure).
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(api_base: &str, credentials: CredentialStore) -> Self {
        Self {
            http: Client::new(),
            base_url: api_base.to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Plot images are fetched by direct URL; the client only joins the
    /// server-returned path onto its base.
    pub fn plot_image_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.url(path)
        }
    }

    /// Outgoing middleware: attach the stored API key when present;
    /// otherwise the request goes out unauthenticated.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.get() {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }

    /// Incoming middleware: success passes through, anything else becomes a
    /// typed error. A 401 additionally clears the credential store, which
    /// is how the caller learns to re-prompt for a key.
    async fn inspect(&self, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(self.response_error(status.as_u16(), &body))
    }

    fn response_error(&self, status: u16, body: &str) -> ClientError {
        let detail = extract_detail(status, body);
        if status == StatusCode::UNAUTHORIZED.as_u16() {
            if let Err(e) = self.credentials.clear() {
                warn!("failed to clear stored API key: {}", e);
            }
            ClientError::Unauthorized { detail }
        } else {
            ClientError::Api { status, detail }
        }
    }

    async fn send_with_retry<F>(&self, make: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0u32;
        loop {
            let err = match make().send().await {
                Ok(resp) => match self.inspect(resp).await {
                    Ok(resp) => return Ok(resp),
                    Err(err) => err,
                },
                Err(e) => ClientError::Request(e),
            };
            if !retry_allowed(&err, retries) {
                return Err(err);
            }
            let delay = retry_delay(retries);
            warn!(
                "request failed ({}), retry {} in {}ms",
                err,
                retries + 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        debug!("📡 GET {}", url);
        let resp = self
            .send_with_retry(|| self.authorize(self.http.get(&url).query(query)))
            .await?;
        Ok(resp.json().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("📡 POST {}", url);
        let resp = self
            .send_with_retry(|| self.authorize(self.http.post(&url).json(body)))
            .await?;
        Ok(resp.json().await?)
    }

    // --- server operations ---

    pub async fn fetch_output_types(&self) -> Result<Vec<OutputTypeInfo>> {
        let resp: OutputTypesResponse = self.get_json("/api/metadata/output-types", &[]).await?;
        Ok(resp.output_types)
    }

    pub async fn fetch_ontology_terms(&self, search: Option<&str>) -> Result<Vec<OntologyTerm>> {
        let query: Vec<(&str, &str)> = match search {
            Some(s) if !s.is_empty() => vec![("search", s)],
            _ => Vec::new(),
        };
        let resp: OntologyTermsResponse =
            self.get_json("/api/metadata/ontology-terms", &query).await?;
        Ok(resp.terms)
    }

    /// Submits a key for server-side validation and stores it on success.
    /// This is the one request that never carries the stored credential.
    pub async fn submit_api_key(&self, api_key: &str) -> Result<()> {
        let url = self.url("/api/config/api-key");
        let body = serde_json::json!({ "api_key": api_key });
        debug!("📡 POST {}", url);
        self.send_with_retry(|| self.http.post(&url).json(&body))
            .await?;
        self.credentials.set(api_key)?;
        Ok(())
    }

    pub async fn predict_interval(&self, req: &IntervalPredictRequest) -> Result<PredictResponse> {
        self.post_json("/api/predict/interval", req).await
    }

    pub async fn predict_variant(&self, req: &VariantPredictRequest) -> Result<PredictResponse> {
        self.post_json("/api/predict/variant", req).await
    }

    pub async fn score_variant(&self, req: &ScoreVariantRequest) -> Result<ScoreResponse> {
        self.post_json("/api/score/variant", req).await
    }

    pub async fn check_health(&self) -> Result<serde_json::Value> {
        self.get_json("/health", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_store() -> (ApiClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        (ApiClient::new("http://localhost:8000/", store), dir)
    }

    #[test]
    fn test_retry_delay_schedule() {
        let delays: Vec<u64> = (0..MAX_NETWORK_RETRIES)
            .map(|i| retry_delay(i).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10_000]);
        // non-decreasing and capped well past the schedule
        assert_eq!(retry_delay(20).as_millis(), 10_000);
    }

    #[test]
    fn test_retry_classification() {
        let api = ClientError::Api {
            status: 500,
            detail: "boom".to_string(),
        };
        assert!(retry_allowed(&api, 0));
        assert!(!retry_allowed(&api, 1));

        let unauthorized = ClientError::Unauthorized {
            detail: "bad key".to_string(),
        };
        assert!(!retry_allowed(&unauthorized, 0));

        let config = ClientError::Config("x".to_string());
        assert!(!retry_allowed(&config, 0));
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(400, r#"{"detail": "Invalid API key: nope"}"#),
            "Invalid API key: nope"
        );
        assert_eq!(
            extract_detail(422, r#"{"detail": [{"loc": ["start"]}]}"#),
            r#"[{"loc":["start"]}]"#
        );
        assert_eq!(extract_detail(502, "bad gateway"), "bad gateway");
        assert_eq!(extract_detail(500, "  "), "request failed with status 500");
    }

    #[test]
    fn test_unauthorized_response_clears_stored_key() {
        let (client, _dir) = client_with_store();
        client.credentials().set("stale-key").unwrap();

        let err = client.response_error(401, r#"{"detail": "Invalid API key"}"#);
        assert!(matches!(err, ClientError::Unauthorized { .. }));
        assert_eq!(client.credentials().get(), None);
        assert_eq!(err.surface(), "Invalid API key");
    }

    #[test]
    fn test_other_errors_keep_stored_key() {
        let (client, _dir) = client_with_store();
        client.credentials().set("good-key").unwrap();

        let err = client.response_error(500, "");
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert_eq!(client.credentials().get(), Some("good-key".to_string()));
    }

    #[test]
    fn test_url_join_trims_trailing_slash() {
        let (client, _dir) = client_with_store();
        assert_eq!(
            client.url("/api/predict/interval"),
            "http://localhost:8000/api/predict/interval"
        );
    }

    #[test]
    fn test_plot_image_url() {
        let (client, _dir) = client_with_store();
        assert_eq!(
            client.plot_image_url("/plots/abc_rna.png"),
            "http://localhost:8000/plots/abc_rna.png"
        );
        assert_eq!(
            client.plot_image_url("https://cdn.example.org/x.png"),
            "https://cdn.example.org/x.png"
        );
    }
}
