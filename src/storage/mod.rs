// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persists one record per client user id: the device address it last used
//! and, once linking finished, the Plaid access token for its item.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   clients.redb    # client_user_id -> StoredClient
//! ```
//!
//! Access tokens are stored as-is. The service is a sandbox quickstart and
//! does not encrypt them at rest.

pub mod client_db;
pub mod paths;

pub use client_db::{ClientDatabase, ClientDbError, ClientDbResult, StoredClient};
pub use paths::StoragePaths;
