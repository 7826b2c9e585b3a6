// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Native-stack navigation over the three demo screens.

use serde_json::Value;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    LinkDemo,
    Success,
}

/// Parameters handed to the Success screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessParams {
    /// Balance endpoint to post to.
    pub server_url: Url,
    pub client_user_id: Option<String>,
}

/// A mounted screen together with its local state.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Home,
    LinkDemo {
        link_token: Option<String>,
    },
    Success {
        params: SuccessParams,
        balance: Option<Value>,
    },
}

impl Screen {
    pub fn link_demo() -> Self {
        Self::LinkDemo { link_token: None }
    }

    pub fn success(params: SuccessParams) -> Self {
        Self::Success {
            params,
            balance: None,
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Self::Home => Route::Home,
            Self::LinkDemo { .. } => Route::LinkDemo,
            Self::Success { .. } => Route::Success,
        }
    }
}

/// Whether `navigate` mounted a new screen or returned to a mounted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Pushed,
    Returned,
}

/// Stack of mounted screens. The root is always Home.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigator {
    root: Screen,
    pushed: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            root: Screen::Home,
            pushed: Vec::new(),
        }
    }

    pub fn current(&self) -> &Screen {
        self.pushed.last().unwrap_or(&self.root)
    }

    pub fn current_mut(&mut self) -> &mut Screen {
        match self.pushed.last_mut() {
            Some(screen) => screen,
            None => &mut self.root,
        }
    }

    pub fn current_route(&self) -> Route {
        self.current().route()
    }

    /// Routes from root to top.
    pub fn routes(&self) -> Vec<Route> {
        std::iter::once(&self.root)
            .chain(&self.pushed)
            .map(Screen::route)
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.pushed.len() + 1
    }

    /// Return to a mounted screen with the same route, dropping everything
    /// above it, or push `screen` if none is mounted.
    pub fn navigate(&mut self, screen: Screen) -> Navigation {
        let route = screen.route();

        if self.root.route() == route {
            self.pushed.clear();
            return Navigation::Returned;
        }

        match self.pushed.iter().rposition(|s| s.route() == route) {
            Some(index) => {
                self.pushed.truncate(index + 1);
                Navigation::Returned
            }
            None => {
                self.pushed.push(screen);
                Navigation::Pushed
            }
        }
    }

    /// Pop the top screen. Returns false when only the root is left.
    pub fn go_back(&mut self) -> bool {
        self.pushed.pop().is_some()
    }
}
