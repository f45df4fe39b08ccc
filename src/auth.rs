//! Mock sign-in and access levels for the demo dashboard.
//!
//! There is no password storage: any password of the minimum length is
//! accepted for a known email.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Sentiment,
    Trading,
    Market,
    Pnl,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Sentiment,
        AccessLevel::Trading,
        AccessLevel::Market,
        AccessLevel::Pnl,
    ];

    /// Levels granted to accounts created through sign-up.
    pub const DEFAULT: [AccessLevel; 2] = [AccessLevel::Sentiment, AccessLevel::Market];

    pub fn name(self) -> &'static str {
        match self {
            AccessLevel::Sentiment => "Sentiment Analysis Engine",
            AccessLevel::Trading => "Trading Pad",
            AccessLevel::Market => "Market Overview",
            AccessLevel::Pnl => "PnL Tracking",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AccessLevel::Sentiment => "Advanced market sentiment analysis and predictive modeling",
            AccessLevel::Trading => "Professional-grade trading interface and execution",
            AccessLevel::Market => "Comprehensive market analysis and data visualization",
            AccessLevel::Pnl => "Real-time performance analytics and risk metrics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub access_levels: Vec<AccessLevel>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Password must be at least 6 characters")]
    WeakPassword,
}

/// Lookup of accounts and their access levels.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<User>;

    async fn find_by_id(&self, id: &str) -> Option<User>;

    /// Store a new account; `None` if the email is taken.
    async fn insert(&self, email: &str, access_levels: Vec<AccessLevel>) -> Option<User>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn with_demo_users() -> Self {
        Self {
            users: RwLock::new(vec![
                User {
                    id: "1".into(),
                    email: "demo@example.com".into(),
                    access_levels: AccessLevel::ALL.to_vec(),
                },
                User {
                    id: "2".into(),
                    email: "basic@example.com".into(),
                    access_levels: AccessLevel::DEFAULT.to_vec(),
                },
            ]),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.email == email).cloned()
    }

    async fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }

    async fn insert(&self, email: &str, access_levels: Vec<AccessLevel>) -> Option<User> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == email) {
            return None;
        }
        let user = User {
            id: (users.len() + 1).to_string(),
            email: email.to_string(),
            access_levels,
        };
        users.push(user.clone());
        Some(user)
    }
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .repo
            .find_by_email(email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if self.repo.find_by_email(email).await.is_some() {
            return Err(AuthError::EmailInUse);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        self.repo
            .insert(email, AccessLevel::DEFAULT.to_vec())
            .await
            .ok_or(AuthError::EmailInUse)
    }

    /// Access levels of `user_id`; unknown users have none.
    pub async fn access_levels(&self, user_id: &str) -> Vec<AccessLevel> {
        self.repo
            .find_by_id(user_id)
            .await
            .map(|u| u.access_levels)
            .unwrap_or_default()
    }
}
