//! Retrieval request context and evidence bundle types

mod bundle;
mod context;
mod request;

pub use bundle::{BundleMeta, EvidenceBundle};
pub use context::RetrievalContext;
pub use request::RetrievalRequest;
