//! Vector record entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::metadata::Metadata;

/// A persisted embedding record, owned by exactly one namespace.
///
/// Records are immutable once written except via full overwrite by the same
/// id; they are deleted explicitly and never expire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub namespace: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    /// Width of `vector`; kept explicit so mixed-generation namespaces can
    /// report which widths they hold.
    pub dimensions: usize,
}

impl VectorRecord {
    /// Creates a record, enforcing `vector.len() == dimensions`.
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let namespace = namespace.into();

        if id.is_empty() {
            return Err(DomainError::validation("Record id must not be empty"));
        }
        if namespace.is_empty() {
            return Err(DomainError::validation("Namespace must not be empty"));
        }
        if id.contains('/') || namespace.contains('/') {
            return Err(DomainError::validation(
                "Record id and namespace must not contain '/'",
            ));
        }
        if vector.is_empty() {
            return Err(DomainError::validation("Vector must not be empty"));
        }

        let dimensions = vector.len();

        Ok(Self {
            id,
            namespace,
            vector,
            metadata,
            created_at: Utc::now(),
            dimensions,
        })
    }

    /// Object-store key for this record
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.id)
    }

    /// Approximate persisted size in bytes
    pub fn approximate_bytes(&self) -> usize {
        self.id.len()
            + self.namespace.len()
            + self.vector.len() * std::mem::size_of::<f32>()
            + serde_json::to_string(&self.metadata).map(|s| s.len()).unwrap_or(0)
    }
}
