//! Wire format of the host channel

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use lockgate_core::LaunchReason;

use crate::commands::CommandResult;

/// One request line: `{"id": 7, "command": "navigate", ...}`
#[derive(Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

impl Envelope {
    /// Parse a line, or produce the error reply for it.
    pub fn parse(line: &str) -> Result<Self, Response> {
        serde_json::from_str(line).map_err(|e| {
            tracing::warn!("Malformed request: {}", e);
            Response {
                id: serde_json::from_str::<IdOnly>(line).ok().and_then(|r| r.id),
                result: CommandResult::err(format!("malformed request: {e}")),
            }
        })
    }
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(default)]
    id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    FrontendReady,
    CheckSession,
    Authenticate {
        password: String,
        #[serde(default)]
        context: Option<String>,
    },
    Logout {
        #[serde(default)]
        context: Option<String>,
    },
    Navigate {
        context: String,
        #[serde(default)]
        window: Option<String>,
        url: String,
    },
    WindowCreated {
        window: String,
        context: String,
        #[serde(default)]
        url: Option<String>,
    },
    ContextClosed {
        context: String,
    },
    Launch {
        reason: LaunchReason,
        /// Account e-mail signed into the browser profile
        #[serde(default)]
        identity: String,
        #[serde(default)]
        context: Option<String>,
    },
    AuthSurfaceOpened {
        context: String,
    },
    Diagnostics,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::FrontendReady => "frontend_ready",
            Request::CheckSession => "check_session",
            Request::Authenticate { .. } => "authenticate",
            Request::Logout { .. } => "logout",
            Request::Navigate { .. } => "navigate",
            Request::WindowCreated { .. } => "window_created",
            Request::ContextClosed { .. } => "context_closed",
            Request::Launch { .. } => "launch",
            Request::AuthSurfaceOpened { .. } => "auth_surface_opened",
            Request::Diagnostics => "diagnostics",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub result: CommandResult<serde_json::Value>,
}

/// Queue a reply for the writer. False once the writer is gone; the
/// reply is dropped and nothing more can reach the shell.
pub fn send_reply(tx: &UnboundedSender<Response>, response: Response) -> bool {
    match tx.send(response) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(id = ?e.0.id, "Reply writer closed, dropping reply");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigate() {
        let envelope = Envelope::parse(
            r#"{"id": 3, "command": "navigate", "context": "12", "url": "https://example.com"}"#,
        )
        .unwrap();

        assert_eq!(envelope.id, Some(3));
        match envelope.request {
            Request::Navigate {
                context,
                window,
                url,
            } => {
                assert_eq!(context, "12");
                assert!(window.is_none());
                assert_eq!(url, "https://example.com");
            }
            other => panic!("unexpected request {}", other.name()),
        }
    }

    #[test]
    fn test_parse_launch_defaults() {
        let envelope = Envelope::parse(r#"{"command": "launch", "reason": "startup"}"#).unwrap();

        assert!(envelope.id.is_none());
        assert!(matches!(
            envelope.request,
            Request::Launch {
                reason: LaunchReason::Startup,
                context: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_command_keeps_id() {
        let response = Envelope::parse(r#"{"id": 9, "command": "self_destruct"}"#)
            .err()
            .unwrap();

        assert_eq!(response.id, Some(9));
        assert!(!response.result.success);
    }

    #[test]
    fn test_garbage_line() {
        let response = Envelope::parse("not json").err().unwrap();

        assert!(response.id.is_none());
        assert!(response.result.error.unwrap().starts_with("malformed request"));
    }

    #[test]
    fn test_send_reply_reports_closed_writer() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let reply = || Response {
            id: Some(4),
            result: CommandResult::ok(serde_json::Value::Null),
        };

        assert!(send_reply(&tx, reply()));
        drop(rx);
        assert!(!send_reply(&tx, reply()));
        assert!(tx.is_closed());
    }

    #[test]
    fn test_response_wire_format() {
        let response = Response {
            id: Some(1),
            result: CommandResult::ok(serde_json::json!({"authenticated": false})),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["authenticated"], false);
    }
}
