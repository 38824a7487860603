//! Authentication: HTTP client, error taxonomy and the session controller.

mod client;
mod controller;
mod error;

pub use client::{AuthClient, LoginResponse, SessionInfo, USER_AGENT};
pub use controller::{AuthController, AuthState};
pub use error::AuthError;
