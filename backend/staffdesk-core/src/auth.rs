// src/auth.rs

use reqwest::Method;
use tracing::{info, warn};

use crate::api_client::{ApiClient, ApiRequest};
use crate::error::{Result, StaffdeskError};
use crate::models::{LoginRequest, LoginResponse};
use crate::route_guard::{Navigation, Route, RouteGuard};

pub const LOGIN_PATH: &str = "Auth/Login";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a token and stores it (plus the user id,
    /// when the backend returns one) in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = ApiRequest::new(Method::POST, LOGIN_PATH).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let response: LoginResponse = match self.client.send_and_deserialize(request, "login").await
        {
            Ok(response) => response,
            Err(StaffdeskError::SessionExpired) => return Err(StaffdeskError::InvalidCredentials),
            Err(StaffdeskError::ApiError { status, .. })
                if matches!(status.as_u16(), 400 | 403 | 404) =>
            {
                return Err(StaffdeskError::InvalidCredentials)
            }
            Err(e) => return Err(e),
        };

        let token = match response.token.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => {
                warn!("Login response carried no token");
                return Err(StaffdeskError::InvalidCredentials);
            }
        };

        let session = self.client.session();
        session.set_token(token)?;
        match response.user.as_ref() {
            Some(user) => session.set_user_id(&user.id.as_key())?,
            None => session.clear_user_id()?,
        }
        info!("Logged in as {}", email);
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.client.session().clear()
    }
}

/// State behind the login form. Failures stay on the form; success moves
/// the guard to `Authenticated` and heads to the dashboard.
#[derive(Debug, Default)]
pub struct LoginView {
    error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(
        &mut self,
        auth: &AuthService,
        guard: &mut RouteGuard,
        email: &str,
        password: &str,
    ) -> Navigation {
        match auth.login(email, password).await {
            Ok(_) => {
                self.error = None;
                guard.on_login();
                guard.navigate(Route::Dashboard)
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                self.error = Some(match e {
                    StaffdeskError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
                    other => other.user_message(INVALID_CREDENTIALS_MESSAGE),
                });
                Navigation::Render(Route::Login)
            }
        }
    }
}
