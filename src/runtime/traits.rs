//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::credential::Credential;
use crate::db::{Database, DbError};
use crate::quizlet::{DataGateway, LoggingGateway, QuizletClient, QuizletConfig};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Session store failure; the dialogue treats every one alike
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Session store error: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        Self::new(e.to_string())
    }
}

/// Per-user key-value storage for the last used set
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_last_set(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    async fn put_last_set(&self, user_id: &str, token: &str) -> Result<(), StoreError>;
}

/// Builds a gateway bound to one linked credential
pub trait GatewayConnector: Send + Sync {
    fn connect(&self, credential: &Credential) -> Arc<dyn DataGateway>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get_last_set(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        (**self).get_last_set(user_id).await
    }

    async fn put_last_set(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        (**self).put_last_set(user_id, token).await
    }
}

impl<T: GatewayConnector + ?Sized> GatewayConnector for Arc<T> {
    fn connect(&self, credential: &Credential) -> Arc<dyn DataGateway> {
        (**self).connect(credential)
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a SessionStore
#[derive(Clone)]
pub struct DatabaseSessionStore {
    db: Database,
}

impl DatabaseSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseSessionStore {
    async fn get_last_set(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.db.get_last_set(user_id).map_err(StoreError::from)
    }

    async fn put_last_set(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        self.db.put_last_set(user_id, token).map_err(StoreError::from)
    }
}

/// Connects to Quizlet over HTTP, sharing one connection pool across users
pub struct QuizletConnector {
    client: reqwest::Client,
    config: QuizletConfig,
}

impl QuizletConnector {
    pub fn new(config: QuizletConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.http_client()?,
            config,
        })
    }
}

impl GatewayConnector for QuizletConnector {
    fn connect(&self, credential: &Credential) -> Arc<dyn DataGateway> {
        let client = QuizletClient::new(self.client.clone(), &self.config, credential.clone());
        Arc::new(LoggingGateway::new(
            Arc::new(client),
            credential.owner_id.clone(),
        ))
    }
}
