//! LockGate Remote Service Client
//!
//! Typed access to the authentication service's HTTP/JSON contract:
//! - `GET /health`: liveness
//! - `GET /profiles`: known browser profiles and their account e-mails
//! - `POST /auth/login`: password login for a profile
//! - `GET /auth/verify?token=`: token validity
//!
//! The gate only talks to the service through [`AuthService`], so tests
//! and alternative transports can stand in for [`HttpAuthService`].

mod client;
mod error;
mod service;
mod types;

pub use client::HttpAuthService;
pub use error::RemoteError;
pub use service::AuthService;
pub use types::{
    HealthResponse, LoginResponse, LoginStatus, ProfilesResponse, RemoteProfile, VerifyResponse,
};

pub type Result<T> = std::result::Result<T, RemoteError>;
