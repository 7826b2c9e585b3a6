// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Walks the quickstart screens against a running backend.

use clap::Parser;
use link_quickstart::{
    app::{Control, DemoApp, DemoBackend, LinkOutcome, Platform, ScriptedLinkSdk},
    telemetry::{init_tracing, LogFormat},
};
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "link-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Device the demo pretends to run on
    #[arg(long, value_enum, env = "LINK_DEMO_PLATFORM", default_value = "android")]
    platform: Platform,

    /// Backend base URL (defaults to the platform's host on port 8080)
    #[arg(long, env = "LINK_DEMO_SERVER_URL")]
    server_url: Option<Url>,

    /// Device identifier sent with each request; the backend assigns one when omitted
    #[arg(long, env = "LINK_DEMO_CLIENT_USER_ID")]
    client_user_id: Option<String>,

    /// Public token Link should report; without one the user exits Link
    #[arg(long, env = "LINK_DEMO_PUBLIC_TOKEN")]
    public_token: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format, "info");

    let server_url = match args.server_url {
        Some(url) => url,
        None => Url::parse(&args.platform.default_server_url())?,
    };

    let script = args
        .public_token
        .map(LinkOutcome::success)
        .into_iter()
        .collect::<Vec<_>>();

    let mut app = DemoApp::new(
        args.platform,
        DemoBackend::new(server_url),
        ScriptedLinkSdk::new(script),
    );
    if let Some(id) = args.client_user_id {
        app = app.with_client_user_id(id);
    }

    app.launch();
    app.press(Control::LinkDemo).await;
    app.press(Control::OpenLink).await;

    info!(route = ?app.current_route(), "Demo finished");
    println!("{}", app.success_text());

    Ok(())
}
