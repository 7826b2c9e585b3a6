// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plaid API client for link token creation, public token exchange and
//! balance retrieval.
//!
//! Every Plaid endpoint is a JSON `POST`. Credentials travel in the request
//! body (`client_id`, `secret`), so the secret must never be logged.

mod types;

use std::{fmt, str::FromStr, time::Duration};

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::config::{env_optional, env_or_default};

pub use types::{
    Account, AccountBalance, AccountItem, AccountType, AccountsBalanceGetRequest,
    AccountsBalanceGetRequestOptions, AccountsGetResponse, CountryCode, E164PhoneNumber,
    ItemPublicTokenExchangeRequest, ItemPublicTokenExchangeResponse, ItemUpdateType, Language,
    LinkTokenCreateRequest, LinkTokenCreateResponse, LinkTokenUser, PlaidErrorResponse,
    PlaidErrorType, Product,
};

const SANDBOX_BASE_URL: &str = "https://sandbox.plaid.com";
const PRODUCTION_BASE_URL: &str = "https://production.plaid.com";
const DEFAULT_CLIENT_NAME: &str = "Plaid Tiny QuickStart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const LINK_TOKEN_CREATE_PATH: &str = "/link/token/create";
const ITEM_PUBLIC_TOKEN_EXCHANGE_PATH: &str = "/item/public_token/exchange";
const ACCOUNTS_BALANCE_GET_PATH: &str = "/accounts/balance/get";

#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    #[error("Plaid configuration missing: {0}")]
    MissingConfig(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Plaid request failed: {0}")]
    Request(String),

    #[error("Plaid response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Plaid API error {}: {}", .0.error_code, .0.error_message)]
    Api(Box<PlaidErrorResponse>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaidEnv {
    #[default]
    Sandbox,
    Production,
}

impl PlaidEnv {
    pub fn base_url(self) -> &'static str {
        match self {
            PlaidEnv::Sandbox => SANDBOX_BASE_URL,
            PlaidEnv::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl fmt::Display for PlaidEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaidEnv::Sandbox => "sandbox",
            PlaidEnv::Production => "production",
        })
    }
}

impl FromStr for PlaidEnv {
    type Err = PlaidError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnv::Sandbox),
            "production" => Ok(PlaidEnv::Production),
            other => Err(PlaidError::MissingConfig(format!(
                "PLAID_ENV must be `sandbox` or `production`, got `{other}`"
            ))),
        }
    }
}

/// Credentials and per-platform link settings.
#[derive(Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    pub env: PlaidEnv,
    pub base_url: String,
    pub client_name: String,
    pub redirect_uri: Option<String>,
    pub android_package_name: Option<String>,
}

// Hand-written so the secret never reaches a log line.
impl fmt::Debug for PlaidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("env", &self.env)
            .field("base_url", &self.base_url)
            .field("client_name", &self.client_name)
            .field("redirect_uri", &self.redirect_uri)
            .field("android_package_name", &self.android_package_name)
            .finish()
    }
}

impl PlaidConfig {
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>, env: PlaidEnv) -> Self {
        Self {
            client_id: client_id.into(),
            secret: secret.into(),
            env,
            base_url: env.base_url().to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            redirect_uri: None,
            android_package_name: None,
        }
    }

    pub fn from_env() -> Result<Self, PlaidError> {
        let client_id = env_required("PLAID_CLIENT_ID")?;
        let secret = env_required("PLAID_SECRET")?;
        let env = match env_optional("PLAID_ENV") {
            Some(raw) => raw.parse()?,
            None => PlaidEnv::Sandbox,
        };

        let mut config = Self::new(client_id, secret, env);
        config.base_url = env_or_default("PLAID_BASE_URL", env.base_url());
        config.client_name = env_or_default("PLAID_CLIENT_NAME", DEFAULT_CLIENT_NAME);
        config.redirect_uri = env_optional("PLAID_REDIRECT_URI");
        config.android_package_name = env_optional("PLAID_ANDROID_PACKAGE_NAME");
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Wraps a request body with the API credentials Plaid expects inline.
#[derive(Serialize)]
struct Authenticated<'a, B> {
    client_id: &'a str,
    secret: &'a str,
    #[serde(flatten)]
    body: &'a B,
}

#[derive(Debug, Clone)]
pub struct PlaidClient {
    config: PlaidConfig,
    http: Client,
}

impl PlaidClient {
    pub fn new(config: PlaidConfig) -> Result<Self, PlaidError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PlaidError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn from_env() -> Result<Self, PlaidError> {
        Self::new(PlaidConfig::from_env()?)
    }

    pub fn config(&self) -> &PlaidConfig {
        &self.config
    }

    /// Mint a short-lived link token for one end user.
    pub async fn link_token_create(
        &self,
        request: &LinkTokenCreateRequest,
    ) -> Result<LinkTokenCreateResponse, PlaidError> {
        let response: LinkTokenCreateResponse =
            self.post_json(LINK_TOKEN_CREATE_PATH, request).await?;
        info!(
            request_id = %response.request_id,
            expiration = %response.expiration,
            "Plaid link token created"
        );
        Ok(response)
    }

    /// Trade the public token from a finished Link session for an access token.
    pub async fn item_public_token_exchange(
        &self,
        public_token: &str,
    ) -> Result<ItemPublicTokenExchangeResponse, PlaidError> {
        let request = ItemPublicTokenExchangeRequest {
            public_token: public_token.to_string(),
        };
        let response: ItemPublicTokenExchangeResponse = self
            .post_json(ITEM_PUBLIC_TOKEN_EXCHANGE_PATH, &request)
            .await?;
        info!(
            item_id = %response.item_id,
            request_id = %response.request_id,
            "Plaid public token exchanged"
        );
        Ok(response)
    }

    /// Real-time balances for every account on an item.
    pub async fn accounts_balance_get(
        &self,
        request: &AccountsBalanceGetRequest,
    ) -> Result<AccountsGetResponse, PlaidError> {
        let response: AccountsGetResponse =
            self.post_json(ACCOUNTS_BALANCE_GET_PATH, request).await?;
        info!(
            item_id = %response.item.item_id,
            accounts = response.accounts.len(),
            "Plaid balances retrieved"
        );
        Ok(response)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, PlaidError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let payload = Authenticated {
            client_id: &self.config.client_id,
            secret: &self.config.secret,
            body,
        };

        debug!(path, env = %self.config.env, "Plaid request");
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PlaidError::Request(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PlaidError::Request(format!("POST {path} body read failed: {e}")))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| {
                PlaidError::InvalidResponse(format!("POST {path} invalid JSON: {e}"))
            });
        }

        match serde_json::from_slice::<PlaidErrorResponse>(&bytes) {
            Ok(error) => {
                warn!(
                    path,
                    %status,
                    error_type = ?error.error_type,
                    error_code = %error.error_code,
                    request_id = ?error.request_id,
                    "Plaid returned an error"
                );
                Err(PlaidError::Api(Box::new(error)))
            }
            Err(_) => Err(PlaidError::InvalidResponse(format!(
                "POST {path} returned {status}: {}",
                String::from_utf8_lossy(&bytes)
            ))),
        }
    }
}

fn env_required(name: &str) -> Result<String, PlaidError> {
    env_optional(name).ok_or_else(|| PlaidError::MissingConfig(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> PlaidClient {
        let config = PlaidConfig::new("client-id", "very-secret", PlaidEnv::Sandbox)
            .with_base_url(server.uri());
        PlaidClient::new(config).unwrap()
    }

    fn link_request() -> LinkTokenCreateRequest {
        LinkTokenCreateRequest::new(
            "Quickstart",
            LinkTokenUser {
                client_user_id: "device-1".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn env_parsing_is_case_insensitive() {
        assert_eq!("Sandbox".parse::<PlaidEnv>().unwrap(), PlaidEnv::Sandbox);
        assert_eq!(
            " PRODUCTION ".parse::<PlaidEnv>().unwrap(),
            PlaidEnv::Production
        );
        assert!(matches!(
            "development".parse::<PlaidEnv>(),
            Err(PlaidError::MissingConfig(_))
        ));
    }

    #[test]
    fn env_base_urls() {
        assert_eq!(PlaidEnv::Sandbox.base_url(), "https://sandbox.plaid.com");
        assert_eq!(
            PlaidEnv::Production.base_url(),
            "https://production.plaid.com"
        );
        assert_eq!(PlaidEnv::Production.to_string(), "production");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = PlaidConfig::new("client-id", "very-secret", PlaidEnv::Sandbox);
        let rendered = format!("{config:?}");
        assert!(rendered.contains("client-id"));
        assert!(!rendered.contains("very-secret"));
    }

    #[tokio::test]
    async fn link_token_create_sends_credentials_inline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .and(body_partial_json(json!({
                "client_id": "client-id",
                "secret": "very-secret",
                "client_name": "Quickstart",
                "user": { "client_user_id": "device-1" },
                "products": ["auth"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "link_token": "link-sandbox-123",
                "expiration": "2026-10-18T12:00:00Z",
                "request_id": "req-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .link_token_create(&link_request())
            .await
            .unwrap();
        assert_eq!(response.link_token, "link-sandbox-123");
        assert_eq!(response.hosted_link_url, None);
    }

    #[tokio::test]
    async fn api_errors_decode_into_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/item/public_token/exchange"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_type": "INVALID_INPUT",
                "error_code": "INVALID_PUBLIC_TOKEN",
                "error_message": "provided public token is in an invalid format",
                "display_message": null,
                "request_id": "req-2"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .item_public_token_exchange("public-bad")
            .await
            .unwrap_err();
        match err {
            PlaidError::Api(error) => {
                assert_eq!(error.error_type, PlaidErrorType::InvalidInput);
                assert_eq!(error.error_code, "INVALID_PUBLIC_TOKEN");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_plaid_failure_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/balance/get"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let request = AccountsBalanceGetRequest {
            access_token: "access-sandbox-1".to_string(),
            options: None,
        };
        let err = client_for(&server)
            .accounts_balance_get(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, PlaidError::InvalidResponse(msg) if msg.contains("bad gateway")));
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = PlaidConfig::new("id", "secret", PlaidEnv::Sandbox)
            .with_base_url(format!("http://{addr}"));
        let err = PlaidClient::new(config)
            .unwrap()
            .item_public_token_exchange("public-1")
            .await
            .unwrap_err();
        assert!(matches!(err, PlaidError::Request(_)));
    }
}
