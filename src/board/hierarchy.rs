use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::board::model::{BoardMovie, BoardMovieInput};

/// Rank, stack, and stamp a validated movie set.
///
/// Order is score descending, then `y`, `x`, and `id` ascending. Rank is the 1-based position
/// in that order and `z = N - rank + 1`. Previous derived values are never consulted.
pub fn compute_hierarchy(movies: &[BoardMovieInput], now: DateTime<Utc>) -> Vec<BoardMovie> {
    let mut sorted: Vec<&BoardMovieInput> = movies.iter().collect();
    sorted.sort_by(|a, b| rank_order(a, b));

    let n = sorted.len() as u32;
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, m)| {
            let rank = i as u32 + 1;
            BoardMovie {
                id: m.id,
                title: m.title.clone(),
                cover_image: m.cover_image.clone(),
                x: m.x,
                y: m.y,
                rotation: m.rotation,
                score: m.score_or_default(),
                z: n - rank + 1,
                rank,
                updated_at: now,
            }
        })
        .collect()
}

/// Total order used for ranking. `-0.0` and `0.0` compare equal.
pub fn rank_order(a: &BoardMovieInput, b: &BoardMovieInput) -> Ordering {
    signless(b.score_or_default())
        .total_cmp(&signless(a.score_or_default()))
        .then_with(|| signless(a.y).total_cmp(&signless(b.y)))
        .then_with(|| signless(a.x).total_cmp(&signless(b.x)))
        .then_with(|| a.id.cmp(&b.id))
}

// Adding positive zero folds `-0.0` into `0.0`.
fn signless(v: f64) -> f64 {
    v + 0.0
}

/// Id of the rank-1 movie.
pub fn leader_of(movies: &[BoardMovie]) -> Option<i64> {
    movies.iter().find(|m| m.rank == 1).map(|m| m.id)
}

#[cfg(test)]
#[path = "../../tests/unit/board/hierarchy.rs"]
mod tests;
