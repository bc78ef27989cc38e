//! Plain data shared across the engine: nodes, variant sets, requests and
//! connection settings.

pub mod node;
pub mod request;
pub mod settings;
