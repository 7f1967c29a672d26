use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::Utc;

use crate::board::hierarchy::{compute_hierarchy, leader_of};
use crate::board::model::{
    BoardMovieInput, BoardState, BoardWrite, MAX_BOARD_MOVIES, board_id_or_default,
    validate_movies,
};
use crate::foundation::error::{CoverError, CoverResult};
use crate::foundation::fsio::atomic_write;

/// Durable, versioned board collection backed by one JSON document.
///
/// Writes to any board go through a single async lock: the document is shared by every board,
/// so read-check-write must be serialized across all of them.
#[derive(Debug)]
pub struct BoardStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

#[derive(serde::Serialize)]
struct BoardsDocumentRef<'a> {
    boards: &'a BTreeMap<String, BoardState>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Wrapped { boards: BTreeMap<String, BoardState> },
    Bare(BTreeMap<String, BoardState>),
}

impl BoardStore {
    /// Store persisted at `path`. Nothing is read until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Location of the board document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state of a board; a board never written reads as empty at version 0.
    pub async fn read(&self, board_id: Option<&str>) -> CoverResult<BoardState> {
        let id = board_id_or_default(board_id);
        let mut boards = self.load().await?;
        Ok(boards
            .remove(id)
            .unwrap_or_else(|| BoardState::empty(id)))
    }

    /// Replace a board's movies wholesale.
    ///
    /// Every movie is validated before any I/O, the set is truncated to
    /// [`MAX_BOARD_MOVIES`], and the hierarchy is recomputed from scratch. A stale
    /// `expected_version` fails with [`CoverError::Conflict`].
    #[tracing::instrument(skip(self, movies), fields(board = board_id_or_default(board_id), count = movies.len()))]
    pub async fn replace(
        &self,
        board_id: Option<&str>,
        mut movies: Vec<BoardMovieInput>,
        expected_version: Option<u64>,
    ) -> CoverResult<BoardState> {
        validate_movies(&movies)?;
        if movies.len() > MAX_BOARD_MOVIES {
            tracing::debug!(dropped = movies.len() - MAX_BOARD_MOVIES, "truncating board");
            movies.truncate(MAX_BOARD_MOVIES);
        }
        let id = board_id_or_default(board_id);

        let _guard = self.write_lock.lock().await;
        let mut boards = self.load().await?;
        let current = boards.get(id).map_or(0, |s| s.version);
        if let Some(expected) = expected_version
            && expected != current
        {
            return Err(CoverError::Conflict { expected, current });
        }

        let now = Utc::now();
        let ranked = compute_hierarchy(&movies, now);
        let state = BoardState {
            board_id: id.to_string(),
            version: current + 1,
            updated_at: Some(now),
            leader_movie_id: leader_of(&ranked),
            movies: ranked,
        };
        boards.insert(id.to_string(), state.clone());
        self.persist(&boards).await?;
        tracing::info!(version = state.version, leader = ?state.leader_movie_id, "board replaced");
        Ok(state)
    }

    /// [`Self::replace`] driven by a write payload.
    pub async fn apply(&self, write: BoardWrite) -> CoverResult<BoardState> {
        self.replace(write.board_id.as_deref(), write.movies, write.expected_version)
            .await
    }

    /// Empty a board. The version still advances so stale writers conflict.
    #[tracing::instrument(skip(self), fields(board = board_id_or_default(board_id)))]
    pub async fn clear(&self, board_id: Option<&str>) -> CoverResult<BoardState> {
        let id = board_id_or_default(board_id);

        let _guard = self.write_lock.lock().await;
        let mut boards = self.load().await?;
        let current = boards.get(id).map_or(0, |s| s.version);
        let state = BoardState {
            version: current + 1,
            updated_at: Some(Utc::now()),
            ..BoardState::empty(id)
        };
        boards.insert(id.to_string(), state.clone());
        self.persist(&boards).await?;
        tracing::info!(version = state.version, "board cleared");
        Ok(state)
    }

    async fn load(&self) -> CoverResult<BTreeMap<String, BoardState>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read board document '{}'", self.path.display()))
                    .into());
            }
        };
        Ok(parse_document(&bytes, &self.path))
    }

    async fn persist(&self, boards: &BTreeMap<String, BoardState>) -> CoverResult<()> {
        let json = serde_json::to_vec_pretty(&BoardsDocumentRef { boards })
            .map_err(|e| CoverError::serde(format!("encode board document: {e}")))?;
        atomic_write(&self.path, &json)
            .await
            .with_context(|| format!("write board document '{}'", self.path.display()))?;
        Ok(())
    }
}

/// Decode either document shape; anything unrecognized reads as no boards.
fn parse_document(bytes: &[u8], path: &Path) -> BTreeMap<String, BoardState> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return BTreeMap::new();
    }
    match serde_json::from_slice::<StoredDocument>(bytes) {
        Ok(StoredDocument::Wrapped { boards } | StoredDocument::Bare(boards)) => boards
            .into_iter()
            .map(|(id, mut state)| {
                state.board_id.clone_from(&id);
                (id, state)
            })
            .collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unrecognized board document, treating as empty");
            BTreeMap::new()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/board/store.rs"]
mod tests;
