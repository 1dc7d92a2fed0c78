//! libSQL backend — async `ThreadStore` implementation.
//!
//! Supports local file and in-memory databases. Ordering inside a thread
//! uses an explicit `seq` column; appends run in a transaction under a
//! per-thread lock, so a thread has at most one writer at a time while
//! unrelated threads proceed concurrently.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::llm::{ChatMessage, Role, ToolCall};
use crate::store::traits::ThreadStore;

/// libSQL thread store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use;
/// `write_lock` keeps each append transaction isolated on that shared
/// connection.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    /// One logical writer per thread id.
    thread_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Serializes write transactions on the shared connection.
    write_lock: Mutex<()>,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_db(db)?;
        store.init_schema().await?;
        info!(path = %path.display(), "Thread store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let store = Self::from_db(db)?;
        store.init_schema().await?;
        Ok(store)
    }

    fn from_db(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
            thread_locks: Mutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
        })
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS thread_messages (
                    id TEXT PRIMARY KEY,
                    thread_id TEXT NOT NULL,
                    seq INTEGER NOT NULL,
                    role TEXT NOT NULL,
                    content TEXT NOT NULL,
                    tool_calls TEXT,
                    tool_call_id TEXT,
                    created_at TEXT NOT NULL,
                    UNIQUE(thread_id, seq)
                );
                CREATE INDEX IF NOT EXISTS idx_thread_messages_thread
                    ON thread_messages(thread_id, seq);",
            )
            .await
            .map_err(|e| StoreError::Open(format!("Failed to initialize schema: {e}")))?;
        Ok(())
    }

    /// Lock guarding the given thread id.
    async fn lock_for(&self, thread_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.thread_locks.lock().await;
        Arc::clone(
            locks
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

// ── Row mapping helpers ─────────────────────────────────────────────

fn role_to_str(role: Role) -> &'static str {
    role.as_str()
}

/// Convert `Option<String>` to a libsql Value.
fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

fn str_to_role(s: &str) -> Result<Role, StoreError> {
    match s {
        "system" => Ok(Role::System),
        "user" => Ok(Role::User),
        "assistant" => Ok(Role::Assistant),
        "tool" => Ok(Role::Tool),
        other => Err(StoreError::Serialization(format!(
            "unknown role in database: {other}"
        ))),
    }
}

/// Read a nullable text column, distinguishing NULL from read failures.
fn opt_text_col(
    row: &libsql::Row,
    idx: i32,
    name: &str,
) -> Result<Option<String>, StoreError> {
    match row.get_value(idx) {
        Ok(libsql::Value::Null) => Ok(None),
        Ok(libsql::Value::Text(s)) => Ok(Some(s)),
        Ok(other) => Err(StoreError::Query(format!(
            "{name} column holds a non-text value: {other:?}"
        ))),
        Err(e) => Err(StoreError::Query(format!("{name} column: {e}"))),
    }
}

fn row_to_message(row: &libsql::Row) -> Result<ChatMessage, StoreError> {
    let role_str: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("role column: {e}")))?;
    let content: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("content column: {e}")))?;
    let tool_calls_json = opt_text_col(row, 2, "tool_calls")?;
    let tool_call_id = opt_text_col(row, 3, "tool_call_id")?;

    let tool_calls: Vec<ToolCall> = match tool_calls_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StoreError::Serialization(format!("tool_calls: {e}")))?,
        None => Vec::new(),
    };

    Ok(ChatMessage {
        role: str_to_role(&role_str)?,
        content,
        tool_calls,
        tool_call_id,
    })
}

#[async_trait]
impl ThreadStore for LibSqlStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT role, content, tool_calls, tool_call_id
                 FROM thread_messages WHERE thread_id = ?1 ORDER BY seq ASC",
                params![thread_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("load: {e}")))?;

        let mut messages = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("load: {e}")))?
        {
            messages.push(row_to_message(&row)?);
        }
        Ok(messages)
    }

    async fn append(&self, thread_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }

        let thread_lock = self.lock_for(thread_id).await;
        let _thread_guard = thread_lock.lock().await;
        let _write_guard = self.write_lock.lock().await;

        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("begin append: {e}")))?;

        let mut rows = tx
            .query(
                "SELECT COALESCE(MAX(seq) + 1, 0) FROM thread_messages WHERE thread_id = ?1",
                params![thread_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("next seq: {e}")))?;
        let mut seq: i64 = match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("next seq: {e}")))?
        {
            Some(row) => row
                .get(0)
                .map_err(|e| StoreError::Query(format!("next seq: {e}")))?,
            None => 0,
        };

        let now = Utc::now().to_rfc3339();
        for message in messages {
            let tool_calls_json = if message.tool_calls.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_string(&message.tool_calls)
                        .map_err(|e| StoreError::Serialization(format!("tool_calls: {e}")))?,
                )
            };

            tx.execute(
                "INSERT INTO thread_messages
                     (id, thread_id, seq, role, content, tool_calls, tool_call_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Uuid::new_v4().to_string(),
                    thread_id,
                    seq,
                    role_to_str(message.role),
                    message.content.as_str(),
                    opt_text(tool_calls_json),
                    opt_text(message.tool_call_id.clone()),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("append: {e}")))?;
            seq += 1;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("commit append: {e}")))?;

        debug!(thread_id, count = messages.len(), "Appended messages");
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT thread_id FROM thread_messages
                 GROUP BY thread_id ORDER BY MAX(created_at) DESC",
                (),
            )
            .await
            .map_err(|e| StoreError::Query(format!("list_threads: {e}")))?;

        let mut threads = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("list_threads: {e}")))?
        {
            threads.push(
                row.get(0)
                    .map_err(|e| StoreError::Query(format!("list_threads: {e}")))?,
            );
        }
        Ok(threads)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
