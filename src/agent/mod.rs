//! Agent module — the conversation engine and the main run loop.

pub mod engine;

pub use engine::{ConversationEngine, TurnResult};

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::error::Error;

/// The main agent: pulls messages off the merged channel stream, runs a
/// turn per message, and routes the reply (or the error) back.
pub struct Agent {
    engine: Arc<ConversationEngine>,
    channels: ChannelManager,
}

impl Agent {
    pub fn new(engine: Arc<ConversationEngine>, channels: ChannelManager) -> Self {
        Self { engine, channels }
    }

    /// Run the agent main loop until ctrl-c or all channel streams end.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        tracing::info!("Agent ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            let response = self.handle_message(&message).await;
            if let Err(e) = self.channels.respond(&message, response).await {
                tracing::error!("Failed to deliver response: {}", e);
            }
        }

        self.channels.shutdown_all().await?;
        Ok(())
    }

    /// Run one turn; turn-aborting errors become a reply on the
    /// originating channel, which decides whether to retry.
    async fn handle_message(&self, message: &IncomingMessage) -> OutgoingResponse {
        tracing::debug!(
            channel = %message.channel,
            user_id = %message.user_id,
            thread_id = %message.thread_id,
            chars = message.content.len(),
            "Handling message"
        );

        match self
            .engine
            .run_turn(&message.thread_id, &message.content)
            .await
        {
            Ok(result) => OutgoingResponse::text(result.reply.content),
            Err(e) => {
                tracing::error!("Turn failed: {}", e);
                OutgoingResponse::text(format!("Error: {e}"))
            }
        }
    }
}
