//! HTTP host adapter for Quizlexa
//!
//! Translates host turns into dialogue events and back.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::ProductionRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
}

impl AppState {
    pub fn new(runtime: ProductionRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }
}
