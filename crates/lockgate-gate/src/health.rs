//! Liveness probe against the auth service

use std::sync::Arc;
use std::time::Duration;

use lockgate_remote::AuthService;

#[derive(Clone)]
pub struct HealthProbe {
    service: Arc<dyn AuthService>,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(service: Arc<dyn AuthService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// True only for a timely `{"status": "healthy"}`. Every failure,
    /// including a slow answer, reads as dead.
    pub async fn is_alive(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.service.health()).await {
            Ok(Ok(health)) if health.is_healthy() => true,
            Ok(Ok(health)) => {
                tracing::warn!(status = %health.status, "Auth service reports unhealthy");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!("Auth service health check failed: {}", e);
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Auth service health check timed out"
                );
                false
            }
        }
    }
}
