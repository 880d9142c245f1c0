// src/route_guard.rs

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::session::{is_token_expired, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Employees,
    Logs,
    Permissions,
    Vacations,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Dashboard,
        Route::Employees,
        Route::Logs,
        Route::Permissions,
        Route::Vacations,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Employees => "/employees",
            Route::Logs => "/logs",
            Route::Permissions => "/permissions",
            Route::Vacations => "/vacations",
        }
    }

    /// Resolves a navigation path. Trailing slashes and query strings are
    /// ignored; unknown paths yield `None`.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Route::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(&normalized))
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Credential not yet checked; nothing renders.
    Unknown,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Guard has not resolved yet; show nothing or a loading indicator.
    Pending,
    Render(Route),
    /// `replace` means the redirect replaces the history entry, so going
    /// back cannot return to the protected view.
    Redirect { to: Route, replace: bool },
}

/// Decides per navigation whether a view may render. Only inspects local
/// credential presence; never touches the network.
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Unknown,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn resolve(&mut self, session: &Session) -> GuardState {
        self.resolve_at(session, Utc::now())
    }

    /// Leaves `Unknown` by checking the session. A stored JWT whose `exp`
    /// has passed counts as absent and is cleared. Once resolved, further
    /// calls keep the current state.
    pub fn resolve_at(&mut self, session: &Session, now: DateTime<Utc>) -> GuardState {
        if self.state != GuardState::Unknown {
            return self.state;
        }

        let token = match session.get_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read session store, treating as logged out: {}", e);
                None
            }
        };

        self.state = match token {
            Some(token) if is_token_expired(&token, now) => {
                if let Err(e) = session.clear() {
                    warn!("Failed to clear expired session: {}", e);
                }
                GuardState::Unauthenticated
            }
            Some(_) => GuardState::Authenticated,
            None => GuardState::Unauthenticated,
        };
        debug!("Route guard resolved to {:?}", self.state);
        self.state
    }

    pub fn navigate(&self, route: Route) -> Navigation {
        match (self.state, route.is_protected()) {
            (GuardState::Unknown, _) => Navigation::Pending,
            (_, false) => Navigation::Render(route),
            (GuardState::Authenticated, true) => Navigation::Render(route),
            (GuardState::Unauthenticated, true) => {
                info!("Redirecting {} to {}", route, Route::Login);
                Navigation::Redirect {
                    to: Route::Login,
                    replace: true,
                }
            }
        }
    }

    /// Navigation by raw path; unknown paths are `None`.
    pub fn navigate_path(&self, path: &str) -> Option<Navigation> {
        Route::from_path(path).map(|route| self.navigate(route))
    }

    pub fn on_login(&mut self) {
        self.state = GuardState::Authenticated;
    }

    /// Clears the session and drops to `Unauthenticated`.
    pub fn logout(&mut self, session: &Session) -> Result<()> {
        self.state = GuardState::Unauthenticated;
        session.clear()
    }
}
