//! Flashcard service gateway
//!
//! The dialogue engine only sees the [`DataGateway`] trait. A gateway value is
//! built per turn from the linked credential, never shared across users.

mod client;
mod error;
mod types;

pub use client::{QuizletClient, QuizletConfig};
pub use error::{GatewayError, GatewayErrorKind};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Operations the dialogue needs from the flashcard service
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Sets created by the linked user
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError>;

    /// Sets the linked user has marked as favorite
    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError>;

    /// Classes the linked user belongs to
    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError>;

    /// Sets shared into a class
    async fn list_class_sets(&self, class_id: ItemId) -> Result<Vec<NavItem>, GatewayError>;

    /// Full set contents including terms
    async fn get_set(&self, set_id: ItemId) -> Result<SetDetail, GatewayError>;

    /// Mark or unmark a set as favorite
    async fn set_favorite(&self, set_id: ItemId, favorite: bool) -> Result<(), GatewayError>;
}

#[async_trait]
impl<T: DataGateway + ?Sized> DataGateway for Arc<T> {
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError> {
        (**self).list_sets().await
    }

    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError> {
        (**self).list_favorites().await
    }

    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError> {
        (**self).list_classes().await
    }

    async fn list_class_sets(&self, class_id: ItemId) -> Result<Vec<NavItem>, GatewayError> {
        (**self).list_class_sets(class_id).await
    }

    async fn get_set(&self, set_id: ItemId) -> Result<SetDetail, GatewayError> {
        (**self).get_set(set_id).await
    }

    async fn set_favorite(&self, set_id: ItemId, favorite: bool) -> Result<(), GatewayError> {
        (**self).set_favorite(set_id, favorite).await
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn DataGateway>,
    owner_id: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn DataGateway>, owner_id: impl Into<String>) -> Self {
        Self {
            inner,
            owner_id: owner_id.into(),
        }
    }

    fn log<T>(&self, operation: &str, start: Instant, result: &Result<T, GatewayError>) {
        let duration = start.elapsed();
        match result {
            Ok(_) => {
                tracing::info!(
                    owner = %self.owner_id,
                    operation,
                    duration_ms = %duration.as_millis(),
                    "Gateway request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    owner = %self.owner_id,
                    operation,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    auth_expired = e.is_auth_expired(),
                    "Gateway request failed"
                );
            }
        }
    }
}

#[async_trait]
impl DataGateway for LoggingGateway {
    async fn list_sets(&self) -> Result<Vec<NavItem>, GatewayError> {
        let start = Instant::now();
        let result = self.inner.list_sets().await;
        self.log("list_sets", start, &result);
        result
    }

    async fn list_favorites(&self) -> Result<Vec<NavItem>, GatewayError> {
        let start = Instant::now();
        let result = self.inner.list_favorites().await;
        self.log("list_favorites", start, &result);
        result
    }

    async fn list_classes(&self) -> Result<Vec<NavItem>, GatewayError> {
        let start = Instant::now();
        let result = self.inner.list_classes().await;
        self.log("list_classes", start, &result);
        result
    }

    async fn list_class_sets(&self, class_id: ItemId) -> Result<Vec<NavItem>, GatewayError> {
        let start = Instant::now();
        let result = self.inner.list_class_sets(class_id).await;
        self.log("list_class_sets", start, &result);
        result
    }

    async fn get_set(&self, set_id: ItemId) -> Result<SetDetail, GatewayError> {
        let start = Instant::now();
        let result = self.inner.get_set(set_id).await;
        self.log("get_set", start, &result);
        result
    }

    async fn set_favorite(&self, set_id: ItemId, favorite: bool) -> Result<(), GatewayError> {
        let start = Instant::now();
        let result = self.inner.set_favorite(set_id, favorite).await;
        self.log("set_favorite", start, &result);
        result
    }
}
