//! Object store implementations

mod in_memory;

pub use in_memory::InMemoryObjectStore;
