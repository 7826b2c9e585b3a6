// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the three `/api` endpoints the demo
//! client calls. They are shared by the server handlers and the headless
//! client so both sides agree on the wire format.
//!
//! Plaid API failures are not HTTP errors here: the endpoints answer `200`
//! and carry Plaid's error envelope in `failure`, leaving the success field
//! `null`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::providers::plaid::{AccountsGetResponse, PlaidErrorResponse};

// =============================================================================
// Link Token
// =============================================================================

/// Request for a fresh Plaid Link token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateLinkTokenRequest {
    /// Address the device reaches the server on. `localhost` means an iOS
    /// simulator; anything else is treated as Android.
    pub address: String,
    /// Stable device identifier. Derived from `address` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_user_id: Option<String>,
    /// Optional E.164 phone number to prefill in Link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CreateLinkTokenResponse {
    /// Identifier the client is registered under. Echoes the request's id or
    /// the one derived from `address`; later calls must send it back.
    pub client_user_id: String,
    /// Link token to hand to the Link SDK.
    pub link_token: Option<String>,
    /// Plaid error envelope when token creation was rejected.
    #[schema(value_type = Option<Object>)]
    pub failure: Option<PlaidErrorResponse>,
}

// =============================================================================
// Public Token Exchange
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ExchangePublicTokenRequest {
    /// Identifier used when the link token was created.
    pub client_user_id: String,
    /// Public token returned by a successful Link session.
    pub public_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExchangePublicTokenResponse {
    #[schema(value_type = Option<Object>)]
    pub failure: Option<PlaidErrorResponse>,
}

// =============================================================================
// Balance
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BalanceRequest {
    /// Identifier of a client that finished linking.
    pub client_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BalanceResponse {
    /// Plaid's `/accounts/balance/get` payload, re-encoded from the modelled
    /// fields of `AccountsGetResponse`.
    #[schema(value_type = Option<Object>)]
    pub balance: Option<AccountsGetResponse>,
    #[schema(value_type = Option<Object>)]
    pub failure: Option<PlaidErrorResponse>,
}
