use crate::domain::{Conversation, ConversationSummary};

use super::super::error::ApiError;
use super::super::Container;

pub struct ConversationController<'a> {
    container: &'a Container,
}

impl<'a> ConversationController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn get(&self, id: &str) -> Result<Conversation, ApiError> {
        let use_case = self.container.list_use_case();
        Ok(use_case.get_by_id(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        let use_case = self.container.list_use_case();
        Ok(use_case.execute().await?)
    }
}
