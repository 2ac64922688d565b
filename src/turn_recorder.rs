// Turn recorder: fire-and-forget JSONL persistence of game and turn state
//
// Writes happen on spawned tokio tasks so the move response never waits on
// disk. Failures are logged and dropped; the decision path is unaffected.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::types::{Board, Direction, Game};

/// One line in the recording file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordEntry {
    GameStart {
        game_id: String,
        width: i32,
        height: i32,
        timestamp: String,
    },
    Move(MoveRecord),
}

/// Board state and the move chosen for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub game_id: String,
    pub turn: i32,
    pub you_id: String,
    pub board: Board,
    pub chosen_move: Direction,
    pub timestamp: String,
}

/// Shared recorder handle
/// Uses Arc<Mutex<File>> so concurrent tasks append whole lines
#[derive(Clone)]
pub struct TurnRecorder {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl TurnRecorder {
    /// Opens the recording file (truncating it) when enabled
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return TurnRecorder::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                info!("Turn recording enabled: {}", log_file_path);
                TurnRecorder {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create recording file '{}': {}", log_file_path, e);
                TurnRecorder::disabled()
            }
        }
    }

    /// Creates a disabled recorder (no-op)
    pub fn disabled() -> Self {
        TurnRecorder {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_game_start(&self, game: &Game, board: &Board) -> Option<JoinHandle<()>> {
        self.spawn_write(RecordEntry::GameStart {
            game_id: game.id.clone(),
            width: board.width,
            height: board.height,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn record_move(
        &self,
        game: &Game,
        turn: i32,
        you_id: &str,
        board: Board,
        chosen_move: Direction,
    ) -> Option<JoinHandle<()>> {
        self.spawn_write(RecordEntry::Move(MoveRecord {
            game_id: game.id.clone(),
            turn,
            you_id: you_id.to_string(),
            board,
            chosen_move,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Spawns a task that appends the entry and returns immediately
    ///
    /// The handle is `None` when recording is disabled.
    fn spawn_write(&self, entry: RecordEntry) -> Option<JoinHandle<()>> {
        if !self.enabled {
            return None;
        }

        let file_handle = self.file.clone();
        Some(tokio::spawn(async move {
            Self::write_entry(file_handle, entry).await;
        }))
    }

    async fn write_entry(file_handle: Arc<Mutex<Option<File>>>, entry: RecordEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write recording entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush recording: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize recording entry: {}", e);
                }
            }
        }
    }
}
