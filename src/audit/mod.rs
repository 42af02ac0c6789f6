//! Command log
//!
//! Fire-and-forget record of `(user, command, action, outcome)`. The pipeline
//! never fails because logging failed.

use crate::error::AssistantError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command_id: String,
    pub user_id: String,
    pub command: String,
    pub action: String,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
}

impl CommandRecord {
    pub fn new(command_id: &str, user_id: &str, command: &str, action: &str, outcome: &str) -> Self {
        let mut record = Self {
            command_id: command_id.to_string(),
            user_id: user_id.to_string(),
            command: command.to_string(),
            action: action.to_string(),
            outcome: outcome.to_string(),
            created_at: Utc::now(),
            fingerprint: String::new(),
        };
        record.fingerprint = compute_fingerprint(&record);
        record
    }
}

/// Trait for the persistence collaborator
#[async_trait::async_trait]
pub trait CommandLog: Send + Sync {
    async fn record(&self, record: CommandRecord) -> Result<()>;
}

/// In-process command log
pub struct InMemoryCommandLog {
    records: Arc<RwLock<HashMap<String, CommandRecord>>>,
}

impl InMemoryCommandLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, command_id: &str) -> Option<CommandRecord> {
        let records = self.records.read().await;
        records.get(command_id).cloned()
    }

    /// Records for a user, oldest first
    pub async fn list_for_user(&self, user_id: &str) -> Vec<CommandRecord> {
        let records = self.records.read().await;

        let mut items: Vec<CommandRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|r| r.created_at);
        items
    }

    /// Recompute a record's fingerprint and compare
    pub async fn verify_integrity(&self, command_id: &str) -> bool {
        let records = self.records.read().await;
        records
            .get(command_id)
            .map(|r| compute_fingerprint(r) == r.fingerprint)
            .unwrap_or(false)
    }
}

impl Default for InMemoryCommandLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandLog for InMemoryCommandLog {
    async fn record(&self, record: CommandRecord) -> Result<()> {
        if record.command_id.is_empty() {
            return Err(AssistantError::Audit("command_id is required".to_string()));
        }

        let mut records = self.records.write().await;
        records.insert(record.command_id.clone(), record);
        Ok(())
    }
}

/// SHA-256 over the logged fields, streamed into the hasher
pub fn compute_fingerprint(record: &CommandRecord) -> String {
    let mut hasher = Sha256::new();

    let fields = (
        &record.user_id,
        &record.command,
        &record.action,
        &record.outcome,
    );
    if serde_json::to_writer(&mut HashWriter(&mut hasher), &fields).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
