pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatOrchestrator, ConversationRepository, ListConversationsUseCase, RetrievalFailure,
    UpstreamClient, DEFAULT_MODEL,
};

pub use connector::{
    ApiError, Container, ContainerConfig, Credential, HttpUpstreamClient,
    InMemoryConversationRepository, MockResponseGenerator, MockUpstreamClient, Router,
};

pub use domain::{
    ChatInput, ContentItem, Conversation, ConversationSummary, DomainError, FetchedMessage,
    Message, MessageRequestedResponse, PendingRetrieval, RetryPolicy, Role,
};
