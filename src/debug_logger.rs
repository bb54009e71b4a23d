// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the turn loop. Each turn's snapshot, status table and commands are written
// to a JSONL file so the turn can be replayed later.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::behavior::UnitStatus;
use crate::types::{GameConstants, TurnSnapshot, UnitId};

/// Represents a single debug log entry
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DebugLogEntry {
    pub turn: u32,
    pub constants: GameConstants,
    pub snapshot: TurnSnapshot,
    /// Status table as it was *before* this turn was planned
    pub statuses: Vec<(UnitId, UnitStatus)>,
    /// The command line sent to the engine
    pub commands: String,
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    /// Writes spawned since the last flush
    pending: Arc<StdMutex<Vec<JoinHandle<()>>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    pending: Arc::new(StdMutex::new(Vec::new())),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            pending: Arc::new(StdMutex::new(Vec::new())),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a planned turn asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log_turn(
        &self,
        constants: GameConstants,
        snapshot: TurnSnapshot,
        statuses: Vec<(UnitId, UnitStatus)>,
        commands: String,
    ) {
        if !self.enabled {
            return;
        }

        let entry = DebugLogEntry {
            turn: snapshot.turn,
            constants,
            snapshot,
            statuses,
            commands,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let file_handle = self.file.clone();

        let handle = tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        });

        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(e) => error!("Debug log bookkeeping poisoned: {}", e),
        }
    }

    /// Waits for every in-flight write and flushes the file
    pub async fn flush(&self) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Debug log write task failed: {}", e);
            }
        }

        let mut file_guard = self.file.lock().await;
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = file.flush().await {
                error!("Failed to flush debug log: {}", e);
            }
        }
    }

    /// Internal async function that performs the actual file write
    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Player, PlayerId, Position};

    impl DebugLogger {
        fn pending_writes(&self) -> usize {
            self.pending.lock().map(|p| p.len()).unwrap_or(0)
        }

        fn has_unfinished_writes(&self) -> bool {
            self.pending
                .lock()
                .map(|p| p.iter().any(|h| !h.is_finished()))
                .unwrap_or(false)
        }
    }

    fn snapshot(turn: u32) -> TurnSnapshot {
        TurnSnapshot {
            turn,
            my_id: PlayerId(0),
            width: 2,
            height: 2,
            halite: vec![10, 20, 30, 40],
            players: vec![Player {
                id: PlayerId(0),
                halite: 1000,
                shipyard: Position::new(1, 1),
                dropoffs: vec![],
                units: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_log_turn_writes_jsonl() {
        let path = std::env::temp_dir().join(format!(
            "halite_debug_logger_{}.jsonl",
            std::process::id()
        ));
        let path_str = path.to_string_lossy().to_string();

        let logger = DebugLogger::new(true, &path_str).await;
        assert!(logger.is_enabled());

        logger.log_turn(
            GameConstants::default(),
            snapshot(1),
            vec![(UnitId(3), UnitStatus::Returning)],
            "m 3 n g".to_string(),
        );
        logger.log_turn(GameConstants::default(), snapshot(2), vec![], "g".to_string());
        logger.flush().await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        let mut entries: Vec<DebugLogEntry> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        entries.sort_by_key(|e| e.turn);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].commands, "m 3 n g");
        assert_eq!(entries[0].statuses, vec![(UnitId(3), UnitStatus::Returning)]);
        assert_eq!(entries[0].snapshot, snapshot(1));
        assert_eq!(entries[1].turn, 2);
    }

    #[tokio::test]
    async fn test_finished_writes_are_not_retained() {
        let path = std::env::temp_dir().join(format!(
            "halite_debug_logger_pending_{}.jsonl",
            std::process::id()
        ));
        let logger = DebugLogger::new(true, &path.to_string_lossy()).await;

        for turn in 1..=20 {
            logger.log_turn(GameConstants::default(), snapshot(turn), vec![], "g".to_string());
            // Let the write finish before the next turn is logged
            while logger.has_unfinished_writes() {
                tokio::task::yield_now().await;
            }
        }
        assert_eq!(logger.pending_writes(), 1);

        logger.flush().await;
        assert_eq!(logger.pending_writes(), 0);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.ok();
        assert_eq!(contents.lines().count(), 20);
    }

    #[tokio::test]
    async fn test_disabled_logger_is_noop() {
        let logger = DebugLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log_turn(GameConstants::default(), snapshot(1), vec![], "g".to_string());
        logger.flush().await;
    }
}
