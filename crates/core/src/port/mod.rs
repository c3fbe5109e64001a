// Port Layer - Interfaces for external dependencies

pub mod definition_store;
pub mod id_provider;
pub mod probe_driver;
pub mod time_provider;

// Re-exports
pub use definition_store::DefinitionStore;
pub use id_provider::IdProvider;
pub use probe_driver::ProbeDriver;
pub use time_provider::TimeProvider;
