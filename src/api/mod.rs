// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        BalanceRequest, BalanceResponse, CreateLinkTokenRequest, CreateLinkTokenResponse,
        ExchangePublicTokenRequest, ExchangePublicTokenResponse,
    },
    state::AppState,
};

pub mod balance;
pub mod health;
pub mod link;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/create_link_token", post(link::create_link_token))
        .route("/exchange_public_token", post(link::exchange_public_token))
        .route("/balance", post(balance::get_balance));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        link::create_link_token,
        link::exchange_public_token,
        balance::get_balance,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreateLinkTokenRequest,
            CreateLinkTokenResponse,
            ExchangePublicTokenRequest,
            ExchangePublicTokenResponse,
            BalanceRequest,
            BalanceResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Link", description = "Plaid Link token lifecycle"),
        (name = "Balance", description = "Account balances for linked clients"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::state_for;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_serves_health_and_openapi() {
        let (state, _dir) = state_for("http://127.0.0.1:9");
        let app = router(state);

        let live = app
            .clone()
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(live.status(), StatusCode::OK);
        assert!(live.headers().contains_key("x-request-id"));

        let spec = app
            .oneshot(
                Request::builder()
                    .uri("/api-doc/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(spec.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_plaid() {
        let (state, _dir) = state_for("http://127.0.0.1:9");
        let response = router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/balance")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
