use anyhow::Result;

use crate::domain::Message;

use super::super::Container;

/// Terminal round-trip: submit one prompt and print the reply.
pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(
        &self,
        prompt: String,
        model: Option<String>,
        conversation_id: Option<String>,
    ) -> Result<String> {
        let orchestrator = self.container.orchestrator();
        let reply = orchestrator
            .submit_and_wait(&prompt, model.as_deref(), conversation_id.as_deref())
            .await?;

        Ok(self.format_reply(&reply))
    }

    fn format_reply(&self, reply: &Message) -> String {
        format!(
            "Conversation: {}\nMessage:      {}\nUpstream:     {}\n\n{}",
            reply.conversation_id(),
            reply.id(),
            self.container.upstream_name(),
            reply.content()
        )
    }
}
