// JSON file implementation of the DefinitionStore port

mod store;

pub use store::JsonDefinitionStore;
