// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Headless Link Demo
//!
//! The three-screen mobile quickstart driven without a UI:
//!
//! - **Home** shows one control that opens the Link demo.
//! - **Link demo** fetches a link token when mounted, configures the SDK with
//!   it, and opens Link on request. A successful link exchanges the public
//!   token and moves on to Success.
//! - **Success** fetches the balance once and renders the raw JSON.
//!
//! Backend failures are logged and swallowed. The screen simply keeps
//! whatever state it had.

pub mod backend;
pub mod link_sdk;
pub mod navigation;

use serde_json::Value;
use tracing::{debug, error, info, warn};

pub use backend::{BackendError, DemoBackend, LinkTokenReply};
pub use link_sdk::{
    IosPresentationStyle, LinkError, LinkExit, LinkLogLevel, LinkOpenProps, LinkOutcome, LinkSdk,
    LinkSuccess, LinkTokenConfiguration, ScriptedLinkSdk, LINK_NOT_CONFIGURED,
};
pub use navigation::{Navigation, Navigator, Route, Screen, SuccessParams};

/// Where the demo runs. Decides the address the backend is reached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Platform {
    /// Android emulator; the host is `10.0.2.2`.
    Android,
    /// iOS simulator; the host is `localhost`.
    Ios,
}

impl Platform {
    pub fn address(self) -> &'static str {
        match self {
            Platform::Android => "10.0.2.2",
            Platform::Ios => "localhost",
        }
    }

    pub fn default_server_url(self) -> String {
        format!("http://{}:8080", self.address())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// "Link Demo" on Home.
    LinkDemo,
    /// "Go Back" on the Link demo screen.
    GoBack,
    /// "Open Link" on the Link demo screen.
    OpenLink,
}

pub struct DemoApp<S> {
    platform: Platform,
    backend: DemoBackend,
    sdk: S,
    client_user_id: Option<String>,
    navigator: Navigator,
}

impl<S: LinkSdk> DemoApp<S> {
    pub fn new(platform: Platform, backend: DemoBackend, sdk: S) -> Self {
        Self {
            platform,
            backend,
            sdk,
            client_user_id: None,
            navigator: Navigator::new(),
        }
    }

    /// Send a device identifier with every backend call. Without one the app
    /// adopts the id the backend assigns when issuing the link token.
    pub fn with_client_user_id(mut self, client_user_id: impl Into<String>) -> Self {
        self.client_user_id = Some(client_user_id.into());
        self
    }

    pub fn launch(&mut self) {
        info!(platform = ?self.platform, server = %self.backend.server_url(), "Launching demo");
        self.navigator = Navigator::new();
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_route(&self) -> Route {
        self.navigator.current_route()
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn controls(&self) -> &'static [Control] {
        match self.current_route() {
            Route::Home => &[Control::LinkDemo],
            Route::LinkDemo => &[Control::GoBack, Control::OpenLink],
            Route::Success => &[],
        }
    }

    /// Link token held by the Link demo screen, if it is on top.
    pub fn link_token(&self) -> Option<&str> {
        match self.navigator.current() {
            Screen::LinkDemo { link_token } => link_token.as_deref(),
            _ => None,
        }
    }

    /// Balance held by the Success screen, if it is on top.
    pub fn balance(&self) -> Option<&Value> {
        match self.navigator.current() {
            Screen::Success { balance, .. } => balance.as_ref(),
            _ => None,
        }
    }

    /// Text shown on the Success screen.
    pub fn success_text(&self) -> String {
        self.balance()
            .map(Value::to_string)
            .unwrap_or_else(|| Value::Null.to_string())
    }

    pub async fn press(&mut self, control: Control) {
        if !self.controls().contains(&control) {
            debug!(?control, route = ?self.current_route(), "Control not shown, ignoring");
            return;
        }

        match control {
            Control::LinkDemo => self.navigate(Screen::link_demo()).await,
            Control::GoBack => {
                self.navigator.go_back();
            }
            Control::OpenLink => self.open_link().await,
        }
    }

    async fn navigate(&mut self, screen: Screen) {
        if self.navigator.navigate(screen) == Navigation::Pushed {
            match self.current_route() {
                Route::LinkDemo => self.mount_link_demo().await,
                Route::Success => self.mount_success().await,
                Route::Home => {}
            }
        }
    }

    async fn mount_link_demo(&mut self) {
        if self.link_token().is_none() {
            let address = self.platform.address();
            info!(address, "Requesting link token");

            match self
                .backend
                .create_link_token(address, self.client_user_id.as_deref())
                .await
            {
                Ok(reply) => {
                    if self.client_user_id.is_none() {
                        if let Some(id) = &reply.client_user_id {
                            debug!(client_user_id = %id, "Adopting backend-assigned client id");
                        }
                        self.client_user_id = reply.client_user_id;
                    }
                    if let Some(failure) = &reply.failure {
                        warn!(%failure, "Backend could not create a link token");
                    }
                    if let Screen::LinkDemo { link_token } = self.navigator.current_mut() {
                        *link_token = reply.link_token;
                    }
                }
                Err(e) => error!(error = %e, "Link token request failed"),
            }
        }

        if let Some(token) = self.link_token().map(str::to_string) {
            self.sdk.create(LinkTokenConfiguration::new(token)).await;
        }
    }

    async fn open_link(&mut self) {
        info!(link_token = ?self.link_token(), "Opening Link");

        let props = LinkOpenProps {
            ios_presentation_style: IosPresentationStyle::Modal,
            log_level: LinkLogLevel::Error,
        };

        match self.sdk.open(props).await {
            LinkOutcome::Success(success) => self.on_link_success(success).await,
            LinkOutcome::Exit(exit) => {
                info!(?exit, "Link exited");
                self.sdk.dismiss().await;
            }
        }
    }

    async fn on_link_success(&mut self, success: LinkSuccess) {
        if let Err(e) = self
            .backend
            .exchange_public_token(&success.public_token, self.client_user_id.as_deref())
            .await
        {
            error!(error = %e, "Public token exchange failed");
            return;
        }

        let server_url = match self.backend.balance_url() {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "Cannot build balance URL");
                return;
            }
        };

        self.navigate(Screen::success(SuccessParams {
            server_url,
            client_user_id: self.client_user_id.clone(),
        }))
        .await;
    }

    async fn mount_success(&mut self) {
        let (url, client_user_id) = match self.navigator.current() {
            Screen::Success {
                params,
                balance: None,
            } => (params.server_url.clone(), params.client_user_id.clone()),
            _ => return,
        };

        match self
            .backend
            .fetch_balance(&url, client_user_id.as_deref())
            .await
        {
            Ok(value) => {
                if let Screen::Success { balance, .. } = self.navigator.current_mut() {
                    *balance = Some(value);
                }
            }
            Err(e) => error!(error = %e, url = %url, "Balance request failed"),
        }
    }
}
