mod http_upstream_client;
mod in_memory_conversation_repository;
mod mock_responses;
mod mock_upstream_client;

pub use http_upstream_client::*;
pub use in_memory_conversation_repository::*;
pub use mock_responses::*;
pub use mock_upstream_client::*;
