use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to a login credential held by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityHandle(pub String);

/// Freshly created credential. The secret is random, single-use, and only
/// surfaced once in the provisioning receipt; the backend must force a
/// reset on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedIdentity {
    pub handle: IdentityHandle,
    pub one_time_secret: String,
}

/// Generate the single-use secret attached to a new login.
pub fn generate_one_time_secret() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Identity backend seam: creates and retracts login credentials.
#[async_trait]
pub trait IdentityProvisioner: Send + Sync {
    /// Create a login for the given email with a fresh one-time secret.
    async fn provision(&self, email: &str) -> Result<ProvisionedIdentity, ProvisionError>;

    /// Compensation hook: remove a credential created earlier in a
    /// submission whose record write failed.
    async fn retract(&self, handle: &IdentityHandle) -> Result<(), ProvisionError>;
}

/// Identity backend failure.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("email already has a login")]
    EmailTaken,
    #[error("email rejected by the identity backend")]
    InvalidEmail,
    #[error("login not found")]
    UnknownHandle,
    #[error("identity backend unavailable: {0}")]
    Unavailable(String),
}
