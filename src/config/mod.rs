//! Configuration models for executors and named registries.

pub mod executor;

pub use executor::{
    validate_throughput, ConcurrencyMode, ExecutorConfig, InsertionEnd, RegistryConfig,
    RemovalEnd, ENV_PREFIX,
};
