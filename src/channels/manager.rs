//! Channel manager — merges channel streams and routes responses back.

use futures::StreamExt;
use futures::stream::select_all;

use crate::channels::channel::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// Owns the active channels.
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Start every channel and merge their streams into one.
    ///
    /// An empty manager is a wiring mistake: the agent would block forever
    /// with no input source.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        if self.is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "manager".to_string(),
                reason: "no channels configured".to_string(),
            });
        }
        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            tracing::info!(channel = channel.name(), "Starting channel");
            streams.push(channel.start().await?);
        }
        Ok(select_all(streams).boxed())
    }

    /// Route a response back to the channel the message came from.
    pub async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.name() == msg.channel)
            .ok_or_else(|| ChannelError::SendFailed {
                name: msg.channel.clone(),
                reason: "no such channel".to_string(),
            })?;
        channel.respond(msg, response).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            channel.shutdown().await?;
        }
        Ok(())
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
