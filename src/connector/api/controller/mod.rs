pub mod ask_controller;
pub mod chat_controller;
pub mod conversation_controller;
pub mod message_controller;

pub use ask_controller::AskController;
pub use chat_controller::ChatController;
pub use conversation_controller::ConversationController;
pub use message_controller::MessageController;
