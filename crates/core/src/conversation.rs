//! Conversation-related types.

use simple_agent_model::ModelMessage;

/// The message history of a single run.
///
/// A conversation is created fresh for every run, seeded with the agent
/// instructions and the user input, and is append-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Creates a conversation seeded with instructions and a user input.
    pub fn seeded<S1, S2>(instructions: S1, input: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            messages: vec![
                ModelMessage::System(instructions.into()),
                ModelMessage::User(input.into()),
            ],
        }
    }

    /// Appends a message.
    #[inline]
    pub fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }

    /// Returns the messages in order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Consumes the conversation, returning the messages.
    #[inline]
    pub fn into_messages(self) -> Vec<ModelMessage> {
        self.messages
    }
}
