// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{providers::plaid::PlaidClient, storage::ClientDatabase};

#[derive(Clone)]
pub struct AppState {
    pub plaid: Arc<PlaidClient>,
    pub clients: Arc<ClientDatabase>,
}

impl AppState {
    pub fn new(plaid: PlaidClient, clients: ClientDatabase) -> Self {
        Self {
            plaid: Arc::new(plaid),
            clients: Arc::new(clients),
        }
    }
}
