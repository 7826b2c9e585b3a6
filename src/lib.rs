// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plaid Link Quickstart
//!
//! A small backend that issues Plaid Link tokens, exchanges public tokens and
//! reports account balances, plus a headless rendition of the three-screen
//! mobile demo that drives it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `app` - Headless demo client (screens, navigation, Link SDK seam)
//! - `providers` - Plaid API client
//! - `storage` - Client records (redb)

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
pub mod telemetry;
