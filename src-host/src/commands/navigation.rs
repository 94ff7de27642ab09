//! Navigation and window events
use lockgate_core::{EventReply, GateEvent};

use super::CommandResult;
use crate::state::AppState;

pub async fn navigate(
    state: &AppState,
    context: String,
    window: Option<String>,
    url: String,
) -> CommandResult<EventReply> {
    let event = GateEvent::Navigation {
        context,
        window,
        url,
    };
    CommandResult::ok(state.gatekeeper().handle_event(&event).await)
}

pub async fn window_created(
    state: &AppState,
    window: String,
    context: String,
    url: Option<String>,
) -> CommandResult<EventReply> {
    let event = GateEvent::WindowCreated {
        window,
        context,
        url,
    };
    CommandResult::ok(state.gatekeeper().handle_event(&event).await)
}

pub fn context_closed(state: &AppState, context: String) -> CommandResult<()> {
    state.gatekeeper().context_closed(&context);
    CommandResult::ok(())
}
