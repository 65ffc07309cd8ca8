//! Infrastructure adapters for the queue store and history log.

pub mod history;
pub mod queue;
pub use history::InMemoryHistory;
pub use queue::InMemoryQueue;
