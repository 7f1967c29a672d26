use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::foundation::error::{CoverResult, ValidationIssues};

/// Board used when callers do not name one.
pub const DEFAULT_BOARD_ID: &str = "default";
/// Movies beyond this count are dropped from a write (positionally).
pub const MAX_BOARD_MOVIES: usize = 200;
/// Upper bound of a movie score.
pub const MAX_SCORE: f64 = 100.0;

/// One cassette as submitted by a board write; derived fields are recomputed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMovieInput {
    /// Catalog id, must be positive.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Cover image reference.
    pub cover_image: String,
    /// Horizontal position in board pixels.
    pub x: f64,
    /// Vertical position in board pixels.
    pub y: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Score in `[0, 100]`; absent means 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl BoardMovieInput {
    /// Score with the default applied.
    pub fn score_or_default(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Whole-board write payload.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardWrite {
    /// Target board; defaults to [`DEFAULT_BOARD_ID`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    /// Replacement movie set.
    #[serde(default)]
    pub movies: Vec<BoardMovieInput>,
    /// Version the caller last read; a mismatch is a conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

/// Persisted cassette with its derived hierarchy fields.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMovie {
    /// Catalog id.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Cover image reference.
    pub cover_image: String,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Score in `[0, 100]`.
    pub score: f64,
    /// Stack order, `N - rank + 1`.
    pub z: u32,
    /// 1-based rank.
    pub rank: u32,
    /// Timestamp of the write that produced this entry.
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of one board.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    /// Board name.
    pub board_id: String,
    /// Starts at 0, +1 per successful write.
    pub version: u64,
    /// Time of the last write; absent before the first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Movies in rank order.
    #[serde(default)]
    pub movies: Vec<BoardMovie>,
    /// Id of the rank-1 movie.
    #[serde(default)]
    pub leader_movie_id: Option<i64>,
}

impl BoardState {
    /// Fresh board at version 0.
    pub fn empty(board_id: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            version: 0,
            updated_at: None,
            movies: Vec::new(),
            leader_movie_id: None,
        }
    }

    /// The top `n` movies by rank (the "next program" projection).
    pub fn lineup(&self, n: usize) -> &[BoardMovie] {
        &self.movies[..n.min(self.movies.len())]
    }
}

/// Resolve an optional board id to a concrete name.
pub fn board_id_or_default(board_id: Option<&str>) -> &str {
    match board_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_BOARD_ID,
    }
}

/// Check every movie and collect all failures as `movies[i].field` issues.
pub fn validate_movies(movies: &[BoardMovieInput]) -> CoverResult<()> {
    let mut issues = ValidationIssues::default();
    let mut first_seen: HashMap<i64, usize> = HashMap::new();

    for (i, m) in movies.iter().enumerate() {
        let field = |name: &str| format!("movies[{i}].{name}");
        if m.id <= 0 {
            issues.push(field("id"), "must be a positive integer");
        } else if let Some(prev) = first_seen.insert(m.id, i) {
            first_seen.insert(m.id, prev);
            issues.push(
                field("id"),
                format!("duplicate id {} (also at movies[{prev}])", m.id),
            );
        }
        if m.title.trim().is_empty() {
            issues.push(field("title"), "must be non-empty");
        }
        if m.cover_image.trim().is_empty() {
            issues.push(field("coverImage"), "must be non-empty");
        }
        for (name, v) in [("x", m.x), ("y", m.y), ("rotation", m.rotation)] {
            if !v.is_finite() {
                issues.push(field(name), "must be a finite number");
            }
        }
        if let Some(score) = m.score
            && (!score.is_finite() || !(0.0..=MAX_SCORE).contains(&score))
        {
            issues.push(field("score"), "must be within [0, 100]");
        }
    }
    issues.into_result()
}

#[cfg(test)]
#[path = "../../tests/unit/board/model.rs"]
mod tests;
