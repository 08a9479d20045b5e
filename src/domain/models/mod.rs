mod chat;
mod conversation;
mod message;
mod retrieval;
mod timestamp;

pub use chat::*;
pub use conversation::*;
pub use message::*;
pub use retrieval::*;
pub use timestamp::*;
