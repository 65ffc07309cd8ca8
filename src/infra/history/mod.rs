//! Execution history backends.

pub mod memory;

pub use memory::InMemoryHistory;
