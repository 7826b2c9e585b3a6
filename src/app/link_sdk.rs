// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Seam around the embedded Plaid Link SDK.
//!
//! The real SDK renders its own UI and reports back through callbacks. Here a
//! session is opened with [`LinkSdk::open`] and resolves to a single
//! [`LinkOutcome`].

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Error code reported when a session is opened before `create`.
pub const LINK_NOT_CONFIGURED: &str = "LINK_NOT_CONFIGURED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTokenConfiguration {
    pub token: String,
    pub no_loading_state: bool,
}

impl LinkTokenConfiguration {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            no_loading_state: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IosPresentationStyle {
    #[default]
    Modal,
    FullScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkLogLevel {
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOpenProps {
    #[serde(rename = "iOSPresentationStyle")]
    pub ios_presentation_style: IosPresentationStyle,
    pub log_level: LinkLogLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSuccess {
    pub public_token: String,
    /// Institution and account metadata, passed through untouched.
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkError {
    pub error_code: String,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_message: Option<String>,
}

/// The user left Link without finishing. Both fields absent means a plain
/// close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkExit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<LinkError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    Success(LinkSuccess),
    Exit(LinkExit),
}

impl LinkOutcome {
    pub fn success(public_token: impl Into<String>) -> Self {
        Self::Success(LinkSuccess {
            public_token: public_token.into(),
            metadata: Value::Null,
        })
    }

    pub fn user_exit() -> Self {
        Self::Exit(LinkExit::default())
    }
}

#[async_trait]
pub trait LinkSdk: Send {
    /// Prepare a session for the given link token.
    async fn create(&mut self, config: LinkTokenConfiguration);

    /// Present Link and wait for the user to finish or leave.
    async fn open(&mut self, props: LinkOpenProps) -> LinkOutcome;

    /// Tear down whatever Link is still showing.
    async fn dismiss(&mut self);
}

/// Replays a fixed list of outcomes, one per `open`.
#[derive(Debug, Default)]
pub struct ScriptedLinkSdk {
    script: VecDeque<LinkOutcome>,
    configuration: Option<LinkTokenConfiguration>,
    create_calls: usize,
    opened: Vec<LinkOpenProps>,
    dismissed: usize,
}

impl ScriptedLinkSdk {
    pub fn new(script: impl IntoIterator<Item = LinkOutcome>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Most recent configuration passed to `create`.
    pub fn configuration(&self) -> Option<&LinkTokenConfiguration> {
        self.configuration.as_ref()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls
    }

    pub fn opened(&self) -> &[LinkOpenProps] {
        &self.opened
    }

    pub fn dismiss_count(&self) -> usize {
        self.dismissed
    }
}

#[async_trait]
impl LinkSdk for ScriptedLinkSdk {
    async fn create(&mut self, config: LinkTokenConfiguration) {
        debug!(token = %config.token, "Link session configured");
        self.create_calls += 1;
        self.configuration = Some(config);
    }

    async fn open(&mut self, props: LinkOpenProps) -> LinkOutcome {
        self.opened.push(props);

        if self.configuration.is_none() {
            return LinkOutcome::Exit(LinkExit {
                status: None,
                error: Some(LinkError {
                    error_code: LINK_NOT_CONFIGURED.to_string(),
                    error_message: "open called before create".to_string(),
                    display_message: None,
                }),
            });
        }

        self.script.pop_front().unwrap_or_else(LinkOutcome::user_exit)
    }

    async fn dismiss(&mut self) {
        self.dismissed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_open_reports_exit() {
        let mut sdk = ScriptedLinkSdk::new([LinkOutcome::success("public-sandbox-1")]);
        let outcome = sdk.open(LinkOpenProps::default()).await;

        match outcome {
            LinkOutcome::Exit(exit) => {
                assert_eq!(exit.error.unwrap().error_code, LINK_NOT_CONFIGURED);
            }
            other => panic!("expected exit, got {other:?}"),
        }
        assert_eq!(sdk.opened().len(), 1);
    }

    #[tokio::test]
    async fn replays_script_then_exits() {
        let mut sdk = ScriptedLinkSdk::new([LinkOutcome::success("public-sandbox-1")]);
        sdk.create(LinkTokenConfiguration::new("link-sandbox-1")).await;

        assert_eq!(
            sdk.open(LinkOpenProps::default()).await,
            LinkOutcome::success("public-sandbox-1")
        );
        assert_eq!(sdk.open(LinkOpenProps::default()).await, LinkOutcome::user_exit());
        assert_eq!(sdk.configuration().unwrap().token, "link-sandbox-1");
        assert!(!sdk.configuration().unwrap().no_loading_state);
    }

    #[test]
    fn open_props_use_sdk_names() {
        let props = LinkOpenProps::default();
        assert_eq!(
            serde_json::to_value(props).unwrap(),
            serde_json::json!({ "iOSPresentationStyle": "MODAL", "logLevel": "ERROR" })
        );
    }
}
