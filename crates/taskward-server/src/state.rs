use std::sync::Arc;
use taskward_audit::AuditLogger;
use taskward_biscuit::{KeyPair, TokenBuilder, TokenVerifier};
use taskward_runtime::{TaskService, UserRepository};

/// Shared application state, injected into every request as an
/// `Extension<Arc<AppState>>`.
pub struct AppState {
    pub service: TaskService,
    pub users: Arc<dyn UserRepository>,
    pub tokens: TokenBuilder,
    pub verifier: TokenVerifier,
    /// Lifetime of tokens issued at login.
    pub token_lifetime: chrono::Duration,
    pub allow_registration: bool,
}

impl AppState {
    pub fn new(
        service: TaskService,
        users: Arc<dyn UserRepository>,
        keypair: KeyPair,
        token_lifetime: chrono::Duration,
    ) -> Self {
        let verifier = TokenVerifier::new(keypair.public_key());
        Self {
            service,
            users,
            tokens: TokenBuilder::new(keypair),
            verifier,
            token_lifetime,
            allow_registration: true,
        }
    }

    pub fn with_registration(mut self, allow: bool) -> Self {
        self.allow_registration = allow;
        self
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        self.service.audit()
    }
}
