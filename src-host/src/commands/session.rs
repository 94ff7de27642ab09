//! Session commands
use secrecy::SecretString;

use lockgate_core::{AuthReply, AuthSurfaceStatus, LaunchReason, LaunchReport, LogoutReply, SessionStatus};

use super::CommandResult;
use crate::state::AppState;

pub async fn check_session(state: &AppState) -> CommandResult<SessionStatus> {
    CommandResult::ok(state.gatekeeper().check_session().await)
}

pub async fn authenticate(
    state: &AppState,
    password: String,
    context: Option<String>,
) -> CommandResult<AuthReply> {
    let password = SecretString::from(password);
    CommandResult::ok(
        state
            .gatekeeper()
            .authenticate(password, context.as_deref())
            .await,
    )
}

pub async fn logout(state: &AppState, context: Option<String>) -> CommandResult<LogoutReply> {
    CommandResult::ok(state.gatekeeper().logout(context.as_deref()).await)
}

pub async fn launch(
    state: &AppState,
    reason: LaunchReason,
    identity: String,
    context: Option<String>,
) -> CommandResult<LaunchReport> {
    CommandResult::ok(
        state
            .gatekeeper()
            .on_launch(reason, &identity, context.as_deref())
            .await,
    )
}

pub async fn auth_surface_opened(
    state: &AppState,
    context: String,
) -> CommandResult<AuthSurfaceStatus> {
    CommandResult::ok(state.gatekeeper().auth_surface_opened(&context).await)
}
