// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Link token creation and public token exchange.

use axum::{extract::State, Json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        CreateLinkTokenRequest, CreateLinkTokenResponse, ExchangePublicTokenRequest,
        ExchangePublicTokenResponse,
    },
    providers::plaid::{
        E164PhoneNumber, LinkTokenCreateRequest, LinkTokenUser, PlaidConfig, PlaidError,
    },
    state::AppState,
};

/// Address the iOS simulator uses to reach the host.
const IOS_SIMULATOR_ADDRESS: &str = "localhost";

/// Deterministic user id for devices that do not send one.
fn derive_client_user_id(address: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, address.as_bytes()).to_string()
}

fn resolve_client_user_id(raw: Option<&str>, address: &str) -> String {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| derive_client_user_id(address))
}

/// iOS gets the OAuth redirect URI, Android the package name.
fn build_link_token_request(
    config: &PlaidConfig,
    client_user_id: &str,
    address: &str,
    phone_number: Option<E164PhoneNumber>,
) -> LinkTokenCreateRequest {
    let user = LinkTokenUser {
        client_user_id: client_user_id.to_string(),
        phone_number,
        ..Default::default()
    };
    let request = LinkTokenCreateRequest::new(config.client_name.clone(), user);

    if address == IOS_SIMULATOR_ADDRESS {
        request.with_redirect_uri(config.redirect_uri.clone())
    } else {
        request.with_android_package_name(config.android_package_name.clone())
    }
}

/// Create a Plaid Link token for a device.
#[utoipa::path(
    post,
    path = "/api/create_link_token",
    tag = "Link",
    request_body = CreateLinkTokenRequest,
    responses(
        (status = 200, description = "Link token created, or Plaid failure in `failure`", body = CreateLinkTokenResponse),
        (status = 400, description = "Invalid address or phone number"),
        (status = 503, description = "Plaid unreachable or misconfigured")
    )
)]
pub async fn create_link_token(
    State(state): State<AppState>,
    Json(request): Json<CreateLinkTokenRequest>,
) -> Result<Json<CreateLinkTokenResponse>, ApiError> {
    info!("Got a request to create a new link token");

    let address = request.address.trim();
    if address.is_empty() {
        return Err(ApiError::bad_request("address must not be empty"));
    }

    let client_user_id = resolve_client_user_id(request.client_user_id.as_deref(), address);
    let phone_number = request
        .phone_number
        .as_deref()
        .map(E164PhoneNumber::parse)
        .transpose()?;

    let plaid_request =
        build_link_token_request(state.plaid.config(), &client_user_id, address, phone_number);

    match state.plaid.link_token_create(&plaid_request).await {
        Ok(created) => {
            state.clients.register(&client_user_id, address)?;
            info!(client_user_id = %client_user_id, address, "Link token issued");
            Ok(Json(CreateLinkTokenResponse {
                client_user_id,
                link_token: Some(created.link_token),
                failure: None,
            }))
        }
        Err(PlaidError::Api(failure)) => {
            warn!(
                client_user_id = %client_user_id,
                error_code = %failure.error_code,
                "Plaid refused to create a link token"
            );
            Ok(Json(CreateLinkTokenResponse {
                client_user_id,
                link_token: None,
                failure: Some(*failure),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

/// Exchange a Link public token and remember the resulting access token.
#[utoipa::path(
    post,
    path = "/api/exchange_public_token",
    tag = "Link",
    request_body = ExchangePublicTokenRequest,
    responses(
        (status = 200, description = "Token exchanged, or Plaid failure in `failure`", body = ExchangePublicTokenResponse),
        (status = 404, description = "Unknown client_user_id"),
        (status = 503, description = "Plaid unreachable or misconfigured")
    )
)]
pub async fn exchange_public_token(
    State(state): State<AppState>,
    Json(request): Json<ExchangePublicTokenRequest>,
) -> Result<Json<ExchangePublicTokenResponse>, ApiError> {
    info!(client_user_id = %request.client_user_id, "Exchanging public token for a Plaid access token");

    // Checked first so a token is never exchanged for a client we cannot store.
    if state.clients.get(&request.client_user_id)?.is_none() {
        return Err(ApiError::not_found(format!(
            "Client {} not found; request a link token first",
            request.client_user_id
        )));
    }

    match state
        .plaid
        .item_public_token_exchange(&request.public_token)
        .await
    {
        Ok(exchanged) => {
            state.clients.store_access_token(
                &request.client_user_id,
                &exchanged.access_token,
                &exchanged.item_id,
            )?;
            Ok(Json(ExchangePublicTokenResponse { failure: None }))
        }
        Err(PlaidError::Api(failure)) => {
            warn!(
                client_user_id = %request.client_user_id,
                error_code = %failure.error_code,
                "Plaid refused the public token"
            );
            Ok(Json(ExchangePublicTokenResponse {
                failure: Some(*failure),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::router, providers::plaid::PlaidEnv, state::testing::state_for};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn link_token_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "link_token": "link-sandbox-abc",
            "expiration": "2026-10-18T12:00:00Z",
            "request_id": "req-1"
        }))
    }

    #[test]
    fn derived_user_id_is_stable_uuid() {
        let first = resolve_client_user_id(None, "10.0.2.2");
        let second = resolve_client_user_id(Some("   "), "10.0.2.2");
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
        assert_eq!(resolve_client_user_id(Some(" device-9 "), "10.0.2.2"), "device-9");
    }

    #[test]
    fn localhost_requests_carry_redirect_uri() {
        let mut config = PlaidConfig::new("id", "secret", PlaidEnv::Sandbox);
        config.redirect_uri = Some("https://example.com/oauth".to_string());
        config.android_package_name = Some("com.example.linkdemo".to_string());

        let ios = build_link_token_request(&config, "device-1", "localhost", None);
        assert_eq!(ios.redirect_uri.as_deref(), Some("https://example.com/oauth"));
        assert!(ios.android_package_name.is_none());

        let android = build_link_token_request(&config, "device-1", "10.0.2.2", None);
        assert!(android.redirect_uri.is_none());
        assert_eq!(
            android.android_package_name.as_deref(),
            Some("com.example.linkdemo")
        );
    }

    #[tokio::test]
    async fn create_link_token_registers_client() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .and(body_partial_json(json!({
                "user": { "client_user_id": "device-1" },
                "android_package_name": "com.example.linkdemo"
            })))
            .respond_with(link_token_ok())
            .expect(1)
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        let (status, body) = post(
            router(state.clone()),
            "/api/create_link_token",
            json!({ "address": "10.0.2.2", "client_user_id": "device-1" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "client_user_id": "device-1",
                "link_token": "link-sandbox-abc",
                "failure": null
            })
        );

        let stored = state.clients.get("device-1").unwrap().unwrap();
        assert_eq!(stored.address, "10.0.2.2");
    }

    #[tokio::test]
    async fn create_link_token_returns_derived_client_id() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .respond_with(link_token_ok())
            .expect(1)
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        let (status, body) = post(
            router(state.clone()),
            "/api/create_link_token",
            json!({ "address": "10.0.2.2" }),
        )
        .await;

        let derived = derive_client_user_id("10.0.2.2");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["client_user_id"], derived.as_str());
        assert!(state.clients.get(&derived).unwrap().is_some());
    }

    #[tokio::test]
    async fn create_link_token_returns_plaid_failure_in_body() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link/token/create"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_type": "INVALID_CONFIGURATION",
                "error_code": "INVALID_FIELD",
                "error_message": "redirect_uri must be configured in the dashboard",
                "request_id": "req-2"
            })))
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        let (status, body) = post(
            router(state.clone()),
            "/api/create_link_token",
            json!({ "address": "localhost", "client_user_id": "device-1" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["link_token"], Value::Null);
        assert_eq!(body["failure"]["error_code"], "INVALID_FIELD");
        assert!(state.clients.get("device-1").unwrap().is_none());
    }

    #[tokio::test]
    async fn create_link_token_rejects_bad_phone_number() {
        let plaid = MockServer::start().await;
        let (state, _dir) = state_for(&plaid.uri());
        let (status, body) = post(
            router(state),
            "/api/create_link_token",
            json!({ "address": "localhost", "phone_number": "555-0100" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid phone number: 555-0100");
    }

    #[tokio::test]
    async fn exchange_requires_known_client() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/item/public_token/exchange"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        let (status, _) = post(
            router(state),
            "/api/exchange_public_token",
            json!({ "client_user_id": "ghost", "public_token": "public-sandbox-1" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exchange_stores_access_token() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/item/public_token/exchange"))
            .and(body_partial_json(json!({ "public_token": "public-sandbox-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-sandbox-1",
                "item_id": "item-1",
                "request_id": "req-3"
            })))
            .expect(1)
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        state.clients.register("device-1", "localhost").unwrap();

        let (status, body) = post(
            router(state.clone()),
            "/api/exchange_public_token",
            json!({ "client_user_id": "device-1", "public_token": "public-sandbox-1" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "failure": null }));

        let stored = state.clients.get("device-1").unwrap().unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("access-sandbox-1"));
        assert_eq!(stored.item_id.as_deref(), Some("item-1"));
    }
}
