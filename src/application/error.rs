//! Errors returned at the session boundary.

use thiserror::Error;

use crate::domain::conversation::StoreError;
use crate::domain::export::ExportError;
use crate::domain::foundation::ValidationError;
use crate::domain::routing::RoutingError;
use crate::ports::{PersistenceError, ProviderError};

/// Failure of an assistant operation.
///
/// Validation failures are returned before any state changes. Provider and
/// persistence failures normally end up in outcomes and notifications; they
/// appear here only where an operation cannot continue without them, such
/// as building a session.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("message store error: {0}")]
    Store(#[from] StoreError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),
}

impl AssistantError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            AssistantError::Validation(err) => Some(err),
            _ => None,
        }
    }
}
