//! The authentication service seam

use async_trait::async_trait;
use secrecy::SecretString;

use crate::types::{HealthResponse, LoginResponse, ProfilesResponse, VerifyResponse};
use crate::Result;

/// Everything the gate needs from the remote authentication service.
///
/// Implementations report transport problems as [`crate::RemoteError`]
/// and leave policy (fail-closed, retries) to the caller.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn health(&self) -> Result<HealthResponse>;

    async fn profiles(&self) -> Result<ProfilesResponse>;

    async fn login(&self, password: &SecretString, profile: &str) -> Result<LoginResponse>;

    async fn verify(&self, token: &str) -> Result<VerifyResponse>;
}
