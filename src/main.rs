// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{future::Future, io};

use link_quickstart::{
    api::router,
    config::ServerConfig,
    providers::plaid::PlaidClient,
    state::AppState,
    storage::{ClientDatabase, StoragePaths},
    telemetry,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_from_env();

    let config = ServerConfig::from_env()?;
    let paths = StoragePaths::new(&config.data_dir);
    let clients = ClientDatabase::open(&paths.clients_db())?;
    info!(path = %paths.clients_db().display(), "Client database opened");

    let plaid = PlaidClient::from_env()?;
    info!(env = %plaid.config().env, "Plaid client configured");

    let app = router(AppState::new(plaid, clients));

    let addr = config.bind_addr().await?;
    let listener = TcpListener::bind(addr).await?;
    info!("Link quickstart server listening on http://{addr} (docs at /docs)");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), signal));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Cancel `token` once `signal` fires. A signal that cannot be installed
/// leaves the token untouched so the server keeps running.
async fn cancel_on_signal<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(error = %e, "Failed to listen for Ctrl-C; graceful shutdown disabled");
        return;
    }
    info!("Shutdown requested");
    token.cancel();
}
