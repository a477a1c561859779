//! Conversation handling: session records, the context store, prompt
//! assembly, and the service that ties them to a completion provider.

pub mod context;
pub mod prompt;
pub mod service;
pub mod store;
