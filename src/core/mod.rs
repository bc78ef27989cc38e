//! Generation engine and the collaborators that feed it.

pub mod chat;
pub mod combiner;
pub mod connectivity;
pub mod export;
pub mod pipeline;
pub mod provider;
pub mod segmenter;
pub mod session;
pub mod settings_store;
