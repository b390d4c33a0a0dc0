//! Hard failures.
//!
//! Game-rule rejections are ordinary return values (`false`, `None`,
//! `Play::Rejected`). Only store failures, unreadable documents, catalog
//! problems and broken invariants become an `EngineError`.

use crate::catalog::CatalogError;
use crate::store::{DocumentKind, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("malformed {kind} document {id}: {source}")]
    Malformed {
        kind: DocumentKind,
        id: String,
        source: serde_json::Error,
    },
    #[error("inconsistent state: {0}")]
    Invariant(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl EngineError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
