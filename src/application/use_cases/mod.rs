mod chat_orchestrator;
mod list_conversations;

pub use chat_orchestrator::*;
pub use list_conversations::*;
