//! HTTP client for the backend proxy.
//!
//! Wraps the three endpoints the client talks to. A cookie jar is kept for
//! the lifetime of the client so the session cookie set by `/api/auth/login`
//! rides along on later requests, mirroring `credentials: include`.
//!
//! Transport and decoding failures come back as `Err`; a non-OK status is a
//! normal `Reply::Rejected` so each flow can decide how loud to be about it.

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::models::{ErrorBody, LoginRequest, ResolvedProfile, User, UserEnvelope};

const SESSION_PATH: [&str; 3] = ["api", "auth", "me"];
const LOGIN_PATH: [&str; 3] = ["api", "auth", "login"];
const PROFILE_PATH: [&str; 3] = ["api", "minecraft", "profile"];

/// Outcome of a request that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// 2xx with a decoded body.
    Ok(T),
    /// Non-2xx. `message` is the body's `message` field when the body was JSON.
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
}

/// Client for the backend proxy.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    /// Creates a client rooted at `base_url` with an empty cookie jar.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Backend URL cannot be used as a base: {base_url}");
        }
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base_url, http })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/auth/me`.
    ///
    /// # Errors
    /// Returns an error on transport failure or an undecodable success body.
    pub async fn current_user(&self) -> Result<Reply<User>> {
        let url = self.endpoint(&SESSION_PATH, None)?;
        tracing::debug!(%url, "checking session");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send session check request")?;
        let reply: Reply<UserEnvelope> = decode(response).await?;
        Ok(map_reply(reply, |envelope| envelope.user))
    }

    /// `POST /api/auth/login` with `{ "credential": .. }`.
    ///
    /// # Errors
    /// Returns an error on transport failure or an undecodable success body.
    pub async fn login(&self, credential: &str) -> Result<Reply<User>> {
        let url = self.endpoint(&LOGIN_PATH, None)?;
        tracing::debug!(%url, "exchanging credential");
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { credential })
            .send()
            .await
            .context("Failed to send login request")?;
        let reply: Reply<UserEnvelope> = decode(response).await?;
        Ok(map_reply(reply, |envelope| envelope.user))
    }

    /// `GET /api/minecraft/profile/:username`.
    ///
    /// The username is sent as-is, percent-encoded as one path segment.
    ///
    /// # Errors
    /// Returns an error on transport failure or an undecodable success body.
    pub async fn profile(&self, username: &str) -> Result<Reply<ResolvedProfile>> {
        let url = self.endpoint(&PROFILE_PATH, Some(username))?;
        tracing::debug!(%url, "looking up profile");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to send profile request")?;
        decode(response).await
    }

    fn endpoint(&self, segments: &[&str], tail: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| anyhow!("Backend URL cannot be used as a base: {}", self.base_url))?;
            path.pop_if_empty().extend(segments);
            if let Some(tail) = tail {
                path.push(tail);
            }
        }
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Reply<T>> {
    let status = response.status();
    if status.is_success() {
        let body = response
            .json::<T>()
            .await
            .context("Failed to parse response body")?;
        return Ok(Reply::Ok(body));
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message);
    tracing::debug!(%status, has_message = message.is_some(), "backend rejected request");
    Ok(Reply::Rejected { status, message })
}

fn map_reply<T, U>(reply: Reply<T>, f: impl FnOnce(T) -> U) -> Reply<U> {
    match reply {
        Reply::Ok(value) => Reply::Ok(f(value)),
        Reply::Rejected { status, message } => Reply::Rejected { status, message },
    }
}
