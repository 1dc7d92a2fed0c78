//! The `Channel` trait and message envelope types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// A user message arriving from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Name of the originating channel (routes the response back).
    pub channel: String,
    pub user_id: String,
    /// Conversation thread this message belongs to.
    pub thread_id: String,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        thread_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            user_id: user_id.into(),
            thread_id: thread_id.into(),
            content: content.into(),
        }
    }
}

/// The agent's reply to an incoming message.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stream of messages produced by a started channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A frontend adapter: owns its own input/output loop and treats local
/// concerns (prompting, exit commands) itself. The engine never sees them.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start the channel and return its message stream. The stream ending
    /// means the channel has terminated locally.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver the agent's reply for a message received on this channel.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
