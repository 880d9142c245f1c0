// src/lib.rs

pub mod api_client;
pub mod auth;
pub mod config;
pub mod dates;
pub mod employee_log;
pub mod employees;
pub mod error;
pub mod models;
pub mod permissions;
pub mod route_guard;
pub mod session;
pub mod vacations;
pub mod workflow;

pub use api_client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Transport};
pub use auth::{AuthService, LoginView};
pub use config::Settings;
pub use error::{Result, StaffdeskError};
pub use route_guard::{GuardState, Navigation, Route, RouteGuard};
pub use session::{FileStore, KeyValueStore, MemoryStore, Session};
pub use workflow::{Decision, Notifications, RequestStatus};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod employees_tests;
#[cfg(test)]
mod permissions_tests;
