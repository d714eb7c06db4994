//! Retrieval orchestration

mod engine;

pub use engine::RetrievalEngine;
