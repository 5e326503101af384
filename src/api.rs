use anyhow::Context;
use log::*;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{Record, RecordFields, RecordId};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("credential rejected by the service")]
    Unauthorized,
    #[error("service answered HTTP {status}")]
    Status { status: StatusCode, detail: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Service-supplied `detail`, else a generic line naming the status.
    pub fn detail_or(&self, what: &str) -> String {
        match self {
            ApiError::Status { detail: Some(d), .. } => d.clone(),
            ApiError::Status { status, .. } => format!("Failed to {}: {}", what, status.as_u16()),
            other => format!("Failed to {}: {}", what, other),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Thin HTTP transport for the document service. One attempt per call, no
/// timeout, no retry.
#[derive(Clone)]
pub struct ServiceClient {
    base: String,
    username: String,
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(base: &str, username: &str) -> anyhow::Result<Self> {
        Url::parse(base).with_context(|| format!("invalid base URL {}", base))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(ServiceClient {
            base: base.trim_end_matches('/').to_owned(),
            username: username.to_owned(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Exchange for a bearer credential. No Authorization header on this one.
    pub async fn authenticate(&self) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url("/auth/token"))
            .query(&[("username", self.username.as_str()), ("role", "admin")])
            .send()
            .await?;
        debug!("Auth response status: {}", resp.status());
        let resp = check(resp).await?;
        let body: TokenResponse = resp.json().await?;
        match body.access_token {
            Some(t) if !t.trim().is_empty() => Ok(t),
            _ => Err(ApiError::Decode("no access_token in auth response".to_owned())),
        }
    }

    pub async fn list(&self, credential: &str) -> Result<Vec<Record>, ApiError> {
        debug!("GET /documents/ with token {}", redact(credential));
        let resp = self
            .client
            .get(self.url("/documents/"))
            .bearer_auth(credential)
            .send()
            .await?;
        debug!("List response status: {}", resp.status());
        let records: Vec<Record> = check(resp).await?.json().await?;
        debug!("Fetched {} documents", records.len());
        Ok(records)
    }

    pub async fn create(&self, credential: &str, fields: &RecordFields) -> Result<Option<Record>, ApiError> {
        debug!("POST /documents/ with token {}", redact(credential));
        let resp = self
            .client
            .post(self.url("/documents/"))
            .bearer_auth(credential)
            .json(fields)
            .send()
            .await?;
        debug!("Create response status: {}", resp.status());
        Ok(decode_record(check(resp).await?).await)
    }

    pub async fn update(
        &self,
        credential: &str,
        sno: &RecordId,
        fields: &RecordFields,
    ) -> Result<Option<Record>, ApiError> {
        debug!("PUT /documents/{} with token {}", sno, redact(credential));
        let resp = self
            .client
            .put(self.url(&format!("/documents/{}", sno)))
            .bearer_auth(credential)
            .json(fields)
            .send()
            .await?;
        debug!("Update response status: {}", resp.status());
        Ok(decode_record(check(resp).await?).await)
    }

    pub async fn delete(&self, credential: &str, sno: &RecordId) -> Result<(), ApiError> {
        debug!("DELETE /documents/{} with token {}", sno, redact(credential));
        let resp = self
            .client
            .delete(self.url(&format!("/documents/{}", sno)))
            .bearer_auth(credential)
            .send()
            .await?;
        debug!("Delete response status: {}", resp.status());
        check(resp).await?;
        Ok(())
    }
}

async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let detail = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .and_then(|d| match d {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });
        return Err(ApiError::Status { status, detail });
    }
    Ok(resp)
}

// The body is informational; the list is re-fetched afterwards anyway.
async fn decode_record(resp: Response) -> Option<Record> {
    match resp.json::<Record>().await {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("Could not decode record from response: {}", e);
            None
        }
    }
}

pub(crate) fn redact(credential: &str) -> String {
    let prefix: String = credential.chars().take(8).collect();
    format!("{}...", prefix)
}
