// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use piliseed_app::{HistorySession, LoginFormInput, User, UserId};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Blocking client for the recommendation backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registers (or re-registers) a farmer by name and returns the user
    /// record the server assigns.
    pub fn register_user(&self, input: &LoginFormInput) -> Result<User> {
        input.validate()?;
        let (first_name, last_name) = input.trimmed();
        let request = RegisterRequest {
            first_name: &first_name,
            last_name: &last_name,
        };

        let response = self
            .http
            .post(self.endpoint("users/register")?)
            .json(&request)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let response = check_status(response)?;

        let user: User = response.json().context("decode registered user")?;
        if user.user_id.as_str().is_empty() {
            bail!("server returned a user without an id");
        }
        tracing::info!(user_id = %user.user_id, "registered user");
        Ok(user)
    }

    pub fn list_history(&self, user_id: &UserId) -> Result<Vec<HistorySession>> {
        let mut url = self.endpoint("recommendations/history/all")?;
        url.query_pairs_mut().append_pair("user_id", user_id.as_str());

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let response = check_status(response)?;

        let parsed: HistoryResponse = response.json().context("decode recommendation history")?;
        tracing::debug!(
            user_id = %user_id,
            sessions = parsed.history.len(),
            "loaded recommendation history"
        );
        Ok(parsed.history)
    }

    pub fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        check_status(response)?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("build endpoint URL for {path}"))
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(clean_error_response(status, &body))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check that the backend is running and [api].base_url is correct ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
    {
        let message = match detail {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        };
        if !message.is_empty() {
            return anyhow!("server error ({}): {}", status.as_u16(), message);
        }
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistorySession>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response};
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn base_url_must_be_http() {
        assert!(Client::new("", Duration::from_secs(1)).is_err());
        assert!(Client::new("ftp://example.com", Duration::from_secs(1)).is_err());
        assert!(Client::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn base_url_keeps_path_prefix() -> anyhow::Result<()> {
        let client = Client::new("http://example.com/api/", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://example.com/api");
        assert_eq!(
            client.endpoint("users/register")?.as_str(),
            "http://example.com/api/users/register"
        );
        Ok(())
    }

    #[test]
    fn error_detail_is_surfaced() {
        let error = clean_error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"first_name is required"}"#,
        );
        assert_eq!(
            error.to_string(),
            "server error (422): first_name is required"
        );

        let plain = clean_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(plain.to_string(), "server error (502): upstream down");

        let opaque = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, "{\"oops\":1}");
        assert_eq!(opaque.to_string(), "server returned 500");
    }
}
