//! Errors surfaced by the index caches and their collaborators

use crate::types::{IndexDescriptor, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a cache operation or of the builder/transfer work it triggered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The descriptor is not part of the role's current generation
    #[error("Index {descriptor} not found in {role} cache")]
    NotFound {
        role: Role,
        descriptor: IndexDescriptor,
    },

    /// The builder rejected the request (invalid range or parameters)
    #[error("Index build failed: {reason}")]
    BuildFailure { reason: String },

    /// Device memory could not satisfy a reservation
    #[error("Device allocation of {requested} bytes failed ({available} bytes available)")]
    AllocationFailure { requested: usize, available: usize },
}

/// Discriminant of [`CacheError`] for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheErrorKind {
    NotFound,
    BuildFailure,
    AllocationFailure,
}

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
    pub fn not_found(role: Role, descriptor: IndexDescriptor) -> Self {
        Self::NotFound { role, descriptor }
    }

    pub fn build_failure(reason: impl Into<String>) -> Self {
        Self::BuildFailure {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> CacheErrorKind {
        match self {
            Self::NotFound { .. } => CacheErrorKind::NotFound,
            Self::BuildFailure { .. } => CacheErrorKind::BuildFailure,
            Self::AllocationFailure { .. } => CacheErrorKind::AllocationFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == CacheErrorKind::NotFound
    }
}
