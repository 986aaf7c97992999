use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

/// The verified identity behind a request. `last_name` travels with the
/// actor because the flight service keys cancellations on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Ulid,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "token invalid or expired"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Token verification is owned by the identity service; this is the seam.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Actor, AuthError>;
}

/// Fixed token → actor table. Useful for tests and single-box deployments
/// where the identity service pre-issues opaque tokens.
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: DashMap<String, Actor>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Actor, AuthError> {
        self.tokens
            .get(token)
            .map(|e| e.value().clone())
            .ok_or(AuthError::InvalidToken)
    }
}
