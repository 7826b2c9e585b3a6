// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded client database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `clients`: client_user_id → serialized StoredClient (JSON bytes)

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Primary table: client_user_id → serialized StoredClient.
const CLIENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("clients");

#[derive(Debug, thiserror::Error)]
pub enum ClientDbError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type ClientDbResult<T> = Result<T, ClientDbError>;

/// One device/user that has asked for a link token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredClient {
    pub client_user_id: String,
    /// Device address reported by the most recent link token request.
    pub address: String,
    /// Plaid access token, present once the public token has been exchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredClient {
    pub fn new(client_user_id: impl Into<String>, address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            client_user_id: client_user_id.into(),
            address: address.into(),
            access_token: None,
            item_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.access_token.is_some()
    }
}

pub struct ClientDatabase {
    db: Database,
}

impl ClientDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> ClientDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLIENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn get(&self, client_user_id: &str) -> ClientDbResult<Option<StoredClient>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CLIENTS)?;
        let client = match table.get(client_user_id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(client)
    }

    /// Record a client the first time it asks for a link token.
    ///
    /// Repeat registrations only refresh the address; a stored access token
    /// survives.
    pub fn register(&self, client_user_id: &str, address: &str) -> ClientDbResult<StoredClient> {
        let write_txn = self.db.begin_write()?;
        let client = {
            let mut table = write_txn.open_table(CLIENTS)?;

            let existing = match table.get(client_user_id)? {
                Some(value) => Some(serde_json::from_slice::<StoredClient>(value.value())?),
                None => None,
            };

            let client = match existing {
                Some(mut client) => {
                    debug!(client_user_id, "Refreshing registered client");
                    client.address = address.to_string();
                    client.updated_at = Utc::now();
                    client
                }
                None => {
                    debug!(client_user_id, "Registering new client");
                    StoredClient::new(client_user_id, address)
                }
            };

            let json = serde_json::to_vec(&client)?;
            table.insert(client_user_id, json.as_slice())?;
            client
        };
        write_txn.commit()?;
        Ok(client)
    }

    /// Attach the Plaid access token for a registered client.
    pub fn store_access_token(
        &self,
        client_user_id: &str,
        access_token: &str,
        item_id: &str,
    ) -> ClientDbResult<StoredClient> {
        let write_txn = self.db.begin_write()?;
        let client = {
            let mut table = write_txn.open_table(CLIENTS)?;

            let existing_bytes = {
                let existing = table
                    .get(client_user_id)?
                    .ok_or_else(|| ClientDbError::NotFound(format!("Client {client_user_id}")))?;
                existing.value().to_vec()
            };

            let mut client: StoredClient = serde_json::from_slice(&existing_bytes)?;
            client.access_token = Some(access_token.to_string());
            client.item_id = Some(item_id.to_string());
            client.updated_at = Utc::now();

            let json = serde_json::to_vec(&client)?;
            table.insert(client_user_id, json.as_slice())?;
            client
        };
        write_txn.commit()?;
        Ok(client)
    }

    /// Confirms a read transaction can be opened on the clients table.
    pub fn health_check(&self) -> ClientDbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(CLIENTS)?;
        Ok(())
    }
}
