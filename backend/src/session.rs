//! Per-operator session state: undo/redo stacks and the pending order
//!
//! Handlers lock the session for the whole of a mutating action, which
//! serializes actions against the store.

use std::path::{Path, PathBuf};

use shared::{HistorySnapshot, HistoryStack, PurchaseOrder};

use crate::config::HistoryConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct Session {
    pub history: HistoryStack,
    pub order: PurchaseOrder,
    history_file: Option<PathBuf>,
}

impl Session {
    /// Empty session; history is kept in memory only
    pub fn new(max_depth: usize) -> Self {
        Self {
            history: HistoryStack::new(max_depth),
            order: PurchaseOrder::new(),
            history_file: None,
        }
    }

    /// Session whose history is read from and written to the configured file.
    ///
    /// An unreadable file is logged and replaced by an empty history.
    pub async fn load(config: &HistoryConfig) -> Self {
        let mut session = Self::new(config.max_depth);
        let Some(path) = config.file.as_ref().map(PathBuf::from) else {
            return session;
        };

        match read_history(&path).await {
            Ok(Some(mut history)) => {
                history.set_max_depth(config.max_depth);
                tracing::info!(
                    undo = history.undo_depth(),
                    redo = history.redo_depth(),
                    "Loaded history from {}",
                    path.display()
                );
                session.history = history;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring history file {}: {}", path.display(), e),
        }

        session.history_file = Some(path);
        session
    }

    /// Record the state captured before a successful action
    pub async fn record(&mut self, snapshot: HistorySnapshot) {
        tracing::debug!(action = %snapshot.action, records = snapshot.len(), "History recorded");
        self.history.record(snapshot);
        self.save_history().await;
    }

    /// Write the stacks out if persistence is configured; failures are logged
    pub async fn save_history(&self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = write_history(path, &self.history).await {
                tracing::error!("Failed to persist history to {}: {}", path.display(), e);
            }
        }
    }
}

async fn read_history(path: &Path) -> AppResult<Option<HistoryStack>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| AppError::Internal(format!("Malformed history: {}", e)))
}

async fn write_history(path: &Path, history: &HistoryStack) -> AppResult<()> {
    let json = serde_json::to_vec_pretty(history)
        .map_err(|e| AppError::Internal(format!("History serialization error: {}", e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}
