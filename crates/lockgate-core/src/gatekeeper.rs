//! Gatekeeper
//!
//! Single owner of the session for one browser profile. Every host
//! entry point lands here and returns a reply plus the host actions it
//! implies.

use secrecy::SecretString;
use std::sync::Arc;

use lockgate_gate::{
    AuthFlow, ContextRegistry, Decision, GateController, GateError, GateEvent, Outcome,
    ProfileIdentifier,
};
use lockgate_remote::{AuthService, HttpAuthService};
use lockgate_session::{Session, SessionStore};
use lockgate_storage::Database;

use crate::actions::{
    AuthReply, AuthSurfaceStatus, EventReply, HostAction, LaunchReason, LaunchReport,
    LogoutReply, SessionStatus,
};
use crate::config::Config;
use crate::Result;

pub struct Gatekeeper {
    config: Config,
    store: SessionStore,
    service: Arc<dyn AuthService>,
    controller: GateController,
    auth: AuthFlow,
    registry: ContextRegistry,
}

impl Gatekeeper {
    /// Open the profile's database and connect to the configured service.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let service = HttpAuthService::new(
            config.service_url()?,
            config.health_timeout(),
            config.request_timeout(),
        )?;

        tracing::info!(
            database = %config.database_path.display(),
            service = %service.base_url(),
            "Gatekeeper initialized"
        );

        Ok(Self::with_service(config, db, Arc::new(service)))
    }

    pub fn with_service(config: Config, db: Database, service: Arc<dyn AuthService>) -> Self {
        let settings = Arc::new(config.gate_settings());
        let store = SessionStore::open(db);
        let registry = ContextRegistry::new();

        let controller = GateController::new(
            store.clone(),
            Arc::clone(&service),
            registry.clone(),
            Arc::clone(&settings),
        );
        let auth = AuthFlow::new(
            Arc::clone(&service),
            store.clone(),
            settings.request_timeout,
            settings.login_ttl,
        );

        Self {
            config,
            store,
            service,
            controller,
            auth,
            registry,
        }
    }

    /// Install, update or browser start: detect the profile, lock, and
    /// put the auth surface in front of the user. The active context is
    /// redirected when the host names one; otherwise a new one is opened.
    pub async fn on_launch(
        &self,
        reason: LaunchReason,
        local_identity: &str,
        active_context: Option<&str>,
    ) -> LaunchReport {
        tracing::info!(reason = ?reason, "Launch");

        let identifier = ProfileIdentifier::new(local_identity);
        let detection = tokio::time::timeout(
            self.config.request_timeout(),
            identifier.detect(self.service.as_ref(), &self.store),
        )
        .await;
        match detection {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!("Profile detection failed: {}", e),
            Err(_) => tracing::warn!("Profile detection timed out"),
        }

        let session = self.lock_session();

        let actions = match active_context {
            Some(context) => vec![self.redirect_action(context)],
            None => vec![HostAction::OpenAuthSurface {
                url: self.config.auth_surface_url.clone(),
            }],
        };

        LaunchReport {
            reason,
            profile: session.bound_profile,
            actions,
        }
    }

    pub async fn handle_event(&self, event: &GateEvent) -> EventReply {
        let decision = self.controller.handle(event).await;

        let actions = match &decision {
            Decision::Allow => Vec::new(),
            Decision::Redirect { to } => vec![HostAction::Redirect {
                context: event.context().to_string(),
                url: to.clone(),
            }],
        };

        EventReply { decision, actions }
    }

    pub async fn check_session(&self) -> SessionStatus {
        SessionStatus {
            authenticated: self.controller.is_authenticated().await,
        }
    }

    /// Submit a password from the auth surface in `origin`.
    ///
    /// The login runs to completion even if the caller goes away; actions
    /// aimed at a context that closed meanwhile are dropped.
    pub async fn authenticate(&self, password: SecretString, origin: Option<&str>) -> AuthReply {
        let auth = self.auth.clone();
        let hint = self.store.read().bound_profile;

        let outcome = match tokio::spawn(async move { auth.submit(&password, &hint).await }).await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Authentication task failed: {}", e);
                Outcome::failure(GateError::Interrupted)
            }
        };

        let actions = match (&outcome, origin) {
            (
                Outcome::Success {
                    bound_profile,
                    different_profile,
                    ..
                },
                Some(context),
            ) if self.registry.is_live(context) => {
                vec![self.close_after_login(context, bound_profile, *different_profile)]
            }
            _ => Vec::new(),
        };

        AuthReply {
            clear_password: outcome.clears_password(),
            message: outcome.message(),
            outcome,
            actions,
        }
    }

    pub async fn logout(&self, active_context: Option<&str>) -> LogoutReply {
        let session = self.lock_session();
        tracing::info!("Logged out");

        LogoutReply {
            logged_out: session.locked,
            actions: active_context
                .map(|context| vec![self.redirect_action(context)])
                .unwrap_or_default(),
        }
    }

    /// The auth surface finished loading in `context`.
    pub async fn auth_surface_opened(&self, context: &str) -> AuthSurfaceStatus {
        self.registry
            .observe(context, None, Some(self.config.auth_surface_url.as_str()));

        let banner = match self.store.mark_initialized() {
            Ok(true) => Some(format!(
                "Please set a security password for profile \"{}\".",
                self.store.read().bound_profile
            )),
            Ok(false) => None,
            Err(e) => {
                tracing::error!("Failed to record first run: {}", e);
                None
            }
        };

        let authenticated = self.controller.is_authenticated().await;
        let session = self.store.read();

        let (message, actions) = if authenticated {
            (
                "Already authenticated. Closing this tab...".to_string(),
                vec![self.close_after_login(context, &session.bound_profile, false)],
            )
        } else {
            (
                "Please authenticate to access this profile.".to_string(),
                Vec::new(),
            )
        };

        AuthSurfaceStatus {
            profile: session.bound_profile,
            authenticated,
            message,
            banner,
            actions,
        }
    }

    pub fn context_closed(&self, context: &str) {
        self.registry.close(context);
    }

    /// Current session, for diagnostics. The token never leaves `Debug`.
    pub fn session(&self) -> Session {
        self.store.read()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    fn lock_session(&self) -> Session {
        // A failed write still leaves the in-memory session locked
        if let Err(e) = self.store.reset() {
            tracing::error!("Failed to persist lock: {}", e);
        }
        self.store.read()
    }

    fn redirect_action(&self, context: &str) -> HostAction {
        HostAction::Redirect {
            context: context.to_string(),
            url: self.config.auth_surface_url.clone(),
        }
    }

    fn close_after_login(
        &self,
        context: &str,
        profile: &str,
        different_profile: bool,
    ) -> HostAction {
        let window = self.registry.window_of(context);

        match window {
            Some(window) if different_profile => HostAction::CloseWindow {
                window,
                profile: profile.to_string(),
            },
            window => HostAction::CloseAuthContext {
                context: context.to_string(),
                open_new_tab_first: window
                    .map(|w| self.registry.contexts_in_window(&w) <= 1)
                    .unwrap_or(false),
            },
        }
    }
}
