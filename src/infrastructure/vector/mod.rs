//! Vector store implementations

mod flat_store;

pub use flat_store::FlatVectorStore;
