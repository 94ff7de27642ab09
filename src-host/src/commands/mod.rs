//! Host commands
//!
//! Each command is a thin call into the gatekeeper; replies are wrapped
//! in [`CommandResult`] so the shell can tell failures apart from data.

pub mod diagnostics;
pub mod navigation;
pub mod session;

use serde::Serialize;

use crate::protocol::Request;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> CommandResult<T> {
    fn into_json(self) -> CommandResult<serde_json::Value> {
        match self.data.map(serde_json::to_value).transpose() {
            Ok(data) => CommandResult {
                success: self.success,
                data,
                error: self.error,
            },
            Err(e) => CommandResult::err(format!("failed to encode reply: {e}")),
        }
    }
}

pub async fn dispatch(state: &AppState, request: Request) -> CommandResult<serde_json::Value> {
    tracing::debug!(command = request.name(), "Dispatching");

    match request {
        Request::FrontendReady => diagnostics::frontend_ready().into_json(),
        Request::Diagnostics => diagnostics::diagnostics(state).into_json(),
        Request::CheckSession => session::check_session(state).await.into_json(),
        Request::Authenticate { password, context } => {
            session::authenticate(state, password, context).await.into_json()
        }
        Request::Logout { context } => session::logout(state, context).await.into_json(),
        Request::Launch {
            reason,
            identity,
            context,
        } => session::launch(state, reason, identity, context)
            .await
            .into_json(),
        Request::AuthSurfaceOpened { context } => {
            session::auth_surface_opened(state, context).await.into_json()
        }
        Request::Navigate {
            context,
            window,
            url,
        } => navigation::navigate(state, context, window, url)
            .await
            .into_json(),
        Request::WindowCreated {
            window,
            context,
            url,
        } => navigation::window_created(state, window, context, url)
            .await
            .into_json(),
        Request::ContextClosed { context } => {
            navigation::context_closed(state, context).into_json()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Envelope;
    use wiremock::MockServer;

    async fn run(state: &AppState, line: &str) -> CommandResult<serde_json::Value> {
        let envelope = Envelope::parse(line).ok().unwrap();
        dispatch(state, envelope.request).await
    }

    #[tokio::test]
    async fn test_dispatch_check_session() {
        let server = MockServer::start().await;
        let state = test_support::state(&server).await;

        let result = run(&state, r#"{"command": "check_session"}"#).await;

        assert!(result.success);
        assert_eq!(result.data.unwrap()["authenticated"], false);
    }

    #[tokio::test]
    async fn test_dispatch_empty_password() {
        let server = MockServer::start().await;
        let state = test_support::state(&server).await;

        let result = run(&state, r#"{"command": "authenticate", "password": ""}"#).await;

        let data = result.data.unwrap();
        assert_eq!(data["outcome"]["status"], "failure");
        assert_eq!(data["message"], "Please enter a password.");
        assert_eq!(data["clear_password"], true);
    }

    #[test]
    fn test_command_result_into_json() {
        let result = CommandResult::ok(vec![1, 2]).into_json();
        assert_eq!(result.data.unwrap(), serde_json::json!([1, 2]));

        let failed = CommandResult::<()>::err("boom".to_string()).into_json();
        assert!(!failed.success);
        assert!(failed.data.is_none());
    }
}
