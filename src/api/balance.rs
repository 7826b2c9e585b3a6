// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account balance endpoint.

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::{
    error::ApiError,
    models::{BalanceRequest, BalanceResponse},
    providers::plaid::{AccountsBalanceGetRequest, PlaidError},
    state::AppState,
};

/// Fetch real-time balances for a linked client.
///
/// Plaid's payload is decoded into `AccountsGetResponse` and re-encoded, so
/// fields it does not model are dropped.
#[utoipa::path(
    post,
    path = "/api/balance",
    tag = "Balance",
    request_body = BalanceRequest,
    responses(
        (status = 200, description = "Balances, or Plaid failure in `failure`", body = BalanceResponse),
        (status = 404, description = "Unknown client_user_id"),
        (status = 409, description = "Client has not finished linking"),
        (status = 503, description = "Plaid unreachable or misconfigured")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    info!(client_user_id = %request.client_user_id, "Retrieving balance for account");

    let client = state
        .clients
        .get(&request.client_user_id)?
        .ok_or_else(|| ApiError::not_found(format!("Client {} not found", request.client_user_id)))?;

    let access_token = client.access_token.ok_or_else(|| {
        ApiError::conflict(format!(
            "Client {} has not linked an account yet",
            request.client_user_id
        ))
    })?;

    let plaid_request = AccountsBalanceGetRequest {
        access_token,
        options: None,
    };

    match state.plaid.accounts_balance_get(&plaid_request).await {
        Ok(balance) => Ok(Json(BalanceResponse {
            balance: Some(balance),
            failure: None,
        })),
        Err(PlaidError::Api(failure)) => {
            warn!(
                client_user_id = %request.client_user_id,
                error_code = %failure.error_code,
                "Plaid refused the balance request"
            );
            Ok(Json(BalanceResponse {
                balance: None,
                failure: Some(*failure),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{api::router, state::testing::state_for};
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

    async fn post_balance(app: axum::Router, client_user_id: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/balance")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "client_user_id": client_user_id }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn balance_payload() -> Value {
        json!({
            "accounts": [{
                "account_id": "acc-1",
                "balances": {
                    "available": 100.0,
                    "current": 110.0,
                    "limit": null,
                    "iso_currency_code": "USD",
                    "unofficial_currency_code": null
                },
                "mask": "0000",
                "name": "Plaid Checking",
                "official_name": null,
                "subtype": "checking",
                "type": "depository"
            }],
            "item": {
                "item_id": "item-1",
                "institution_id": "ins_109508",
                "webhook": null,
                "error": null,
                "available_products": ["balance"],
                "billed_products": ["auth"],
                "consent_expiration_time": null
            },
            "request_id": "req-4",
            "payment_risk_assessment": { "risk_level": "low" }
        })
    }

    #[tokio::test]
    async fn unknown_client_is_404() {
        let plaid = MockServer::start().await;
        let (state, _dir) = state_for(&plaid.uri());
        let (status, _) = post_balance(router(state), "ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unlinked_client_is_409() {
        let plaid = MockServer::start().await;
        let (state, _dir) = state_for(&plaid.uri());
        state.clients.register("device-1", "localhost").unwrap();

        let (status, body) = post_balance(router(state), "device-1").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Client device-1 has not linked an account yet");
    }

    #[tokio::test]
    async fn linked_client_gets_plaid_balances() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/balance/get"))
            .and(body_partial_json(json!({ "access_token": "access-sandbox-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(balance_payload()))
            .expect(1)
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        state.clients.register("device-1", "localhost").unwrap();
        state
            .clients
            .store_access_token("device-1", "access-sandbox-1", "item-1")
            .unwrap();

        let (status, body) = post_balance(router(state), "device-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failure"], Value::Null);
        assert_eq!(body["balance"]["accounts"][0]["account_id"], "acc-1");
        assert_eq!(body["balance"]["accounts"][0]["balances"]["current"], 110.0);
        assert_eq!(body["balance"]["item"]["billed_products"], json!(["auth"]));
        assert!(body["balance"].get("payment_risk_assessment").is_none());
    }

    #[tokio::test]
    async fn plaid_outage_is_503() {
        let plaid = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts/balance/get"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&plaid)
            .await;

        let (state, _dir) = state_for(&plaid.uri());
        state.clients.register("device-1", "localhost").unwrap();
        state
            .clients
            .store_access_token("device-1", "access-sandbox-1", "item-1")
            .unwrap();

        let (status, _) = post_balance(router(state), "device-1").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
