// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the quickstart backend.
//!
//! Mirrors what the mobile screens do with `fetch`: the HTTP status is never
//! inspected and bodies are taken as loose JSON. Only transport failures and
//! bodies that are not JSON at all come back as errors.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::models::CreateLinkTokenRequest;

const CREATE_LINK_TOKEN_PATH: &str = "api/create_link_token";
const EXCHANGE_PUBLIC_TOKEN_PATH: &str = "api/exchange_public_token";
const BALANCE_PATH: &str = "api/balance";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(String),

    #[error("response was not JSON: {0}")]
    InvalidResponse(String),
}

/// Fields the demo reads from `/api/create_link_token`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTokenReply {
    /// Identifier the backend registered the device under.
    pub client_user_id: Option<String>,
    pub link_token: Option<String>,
    pub failure: Option<Value>,
}

impl LinkTokenReply {
    fn from_json(body: &Value) -> Self {
        Self {
            client_user_id: body
                .get("client_user_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            link_token: body
                .get("link_token")
                .and_then(Value::as_str)
                .map(str::to_string),
            failure: body.get("failure").filter(|f| !f.is_null()).cloned(),
        }
    }
}

#[derive(Serialize)]
struct ExchangeBody<'a> {
    public_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_user_id: Option<&'a str>,
}

#[derive(Serialize)]
struct BalanceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_user_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct DemoBackend {
    server_url: Url,
    http: Client,
}

impl DemoBackend {
    /// Endpoints are resolved relative to `server_url`, so a base with a path
    /// prefix needs a trailing slash.
    pub fn new(server_url: Url) -> Self {
        Self {
            server_url,
            http: Client::new(),
        }
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.server_url.join(path)?)
    }

    /// URL the Success screen posts to for balances.
    pub fn balance_url(&self) -> Result<Url, BackendError> {
        self.endpoint(BALANCE_PATH)
    }

    pub async fn create_link_token(
        &self,
        address: &str,
        client_user_id: Option<&str>,
    ) -> Result<LinkTokenReply, BackendError> {
        let url = self.endpoint(CREATE_LINK_TOKEN_PATH)?;
        let body = CreateLinkTokenRequest {
            address: address.to_string(),
            client_user_id: client_user_id.map(str::to_string),
            phone_number: None,
        };

        let json = self.post_json(url, &body).await?;
        Ok(LinkTokenReply::from_json(&json))
    }

    /// The response body is not read.
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
        client_user_id: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(EXCHANGE_PUBLIC_TOKEN_PATH)?;
        let body = ExchangeBody {
            public_token,
            client_user_id,
        };

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        debug!(status = %response.status(), "Public token exchange answered");
        Ok(())
    }

    pub async fn fetch_balance(
        &self,
        url: &Url,
        client_user_id: Option<&str>,
    ) -> Result<Value, BackendError> {
        self.post_json(url.clone(), &BalanceBody { client_user_id })
            .await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Value, BackendError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        debug!(url = %response.url(), status = %response.status(), "Backend answered");

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}
