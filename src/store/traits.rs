//! `ThreadStore` trait — the persistence boundary for conversation threads.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::llm::ChatMessage;

/// Durable, per-thread conversation history.
///
/// A thread is created implicitly the first time messages are appended to
/// its id; the core never deletes threads. `append` must commit before
/// returning — a failed append surfaces as `StoreError`, never as a
/// silent success. Appends to the same thread are serialized by the
/// implementation; unrelated threads may proceed concurrently.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Load the ordered message history for a thread.
    ///
    /// An unseen thread id is not an error; it loads as an empty sequence.
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>, StoreError>;

    /// Atomically extend a thread's history with `messages`, in order.
    async fn append(&self, thread_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError>;

    /// All known thread ids, most recently written first.
    async fn list_threads(&self) -> Result<Vec<String>, StoreError>;
}
