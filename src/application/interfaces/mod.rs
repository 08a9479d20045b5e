mod conversation_repository;
mod upstream_client;

pub use conversation_repository::*;
pub use upstream_client::*;
