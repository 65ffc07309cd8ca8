//! Shared utilities: wall clock, JSON merging and tracing setup.

pub mod clock;
pub mod merge;
pub mod telemetry;

pub use clock::*;
pub use merge::{deep_assign, deep_clone, deep_merge, ArrayMerge, MergeOptions, PropertyMerge};
pub use telemetry::*;
