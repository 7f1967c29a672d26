use super::*;

fn movie(id: i64, score: f64, y: f64) -> BoardMovieInput {
    BoardMovieInput {
        id,
        title: format!("Movie {id}"),
        cover_image: format!("/covers/{id}.webp"),
        x: 0.0,
        y,
        rotation: 0.0,
        score: Some(score),
    }
}

fn store() -> (tempfile::TempDir, BoardStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = BoardStore::new(dir.path().join("data/boards.json"));
    (dir, store)
}

#[tokio::test]
async fn missing_board_reads_empty() {
    let (_dir, store) = store();
    let state = store.read(None).await.unwrap();
    assert_eq!(state.board_id, "default");
    assert_eq!(state.version, 0);
    assert!(state.movies.is_empty());
    assert_eq!(state.leader_movie_id, None);
    assert_eq!(state.updated_at, None);
}

#[tokio::test]
async fn replace_ranks_and_bumps_version() {
    let (_dir, store) = store();
    let state = store
        .replace(
            None,
            vec![movie(1, 50.0, 10.0), movie(2, 50.0, 5.0), movie(3, 90.0, 100.0)],
            Some(0),
        )
        .await
        .unwrap();
    assert_eq!(state.version, 1);
    let ids: Vec<_> = state.movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, [3, 2, 1]);
    assert_eq!(state.leader_movie_id, Some(3));
    assert!(state.updated_at.is_some());

    let again = store.read(Some("default")).await.unwrap();
    assert_eq!(again, state);
}

#[tokio::test]
async fn stale_version_conflicts_without_writing() {
    let (_dir, store) = store();
    store.replace(None, vec![movie(1, 10.0, 0.0)], None).await.unwrap();
    store.replace(None, vec![movie(2, 10.0, 0.0)], Some(1)).await.unwrap();

    let err = store
        .replace(None, vec![movie(3, 10.0, 0.0)], Some(1))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        CoverError::Conflict {
            expected: 1,
            current: 2
        }
    ));

    let state = store.read(None).await.unwrap();
    assert_eq!(state.version, 2);
    assert_eq!(state.movies[0].id, 2);
}

#[tokio::test]
async fn invalid_payload_is_rejected_before_io() {
    let dir = tempfile::tempdir().unwrap();
    // A directory at the document path would make any read fail.
    let path = dir.path().join("boards.json");
    std::fs::create_dir(&path).unwrap();
    let store = BoardStore::new(&path);

    let err = store
        .replace(None, vec![movie(-1, 10.0, 0.0)], None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoverError::Validation(_)));
}

#[tokio::test]
async fn payload_is_truncated_positionally() {
    let (_dir, store) = store();
    let movies: Vec<_> = (1..=205).map(|id| movie(id, 0.0, id as f64)).collect();
    let state = store.replace(None, movies, None).await.unwrap();
    assert_eq!(state.movies.len(), MAX_BOARD_MOVIES);
    assert!(state.movies.iter().all(|m| m.id <= 200));
}

#[tokio::test]
async fn boards_are_independent() {
    let (_dir, store) = store();
    store
        .replace(Some("a"), vec![movie(1, 1.0, 0.0)], None)
        .await
        .unwrap();
    store
        .replace(Some("b"), vec![movie(2, 1.0, 0.0)], None)
        .await
        .unwrap();
    assert_eq!(store.read(Some("a")).await.unwrap().movies[0].id, 1);
    assert_eq!(store.read(Some("b")).await.unwrap().movies[0].id, 2);
    assert_eq!(store.read(None).await.unwrap().version, 0);
}

#[tokio::test]
async fn clear_empties_and_increments() {
    let (_dir, store) = store();
    store
        .replace(None, vec![movie(1, 1.0, 0.0)], None)
        .await
        .unwrap();
    let cleared = store.clear(None).await.unwrap();
    assert_eq!(cleared.version, 2);
    assert!(cleared.movies.is_empty());
    assert_eq!(cleared.leader_movie_id, None);

    let err = store
        .replace(None, vec![movie(5, 1.0, 0.0)], Some(1))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn written_document_is_wrapped() {
    let (_dir, store) = store();
    store
        .replace(None, vec![movie(1, 1.0, 0.0)], None)
        .await
        .unwrap();
    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
    assert_eq!(raw["boards"]["default"]["version"], 1);
    assert_eq!(raw["boards"]["default"]["leaderMovieId"], 1);
}

#[tokio::test]
async fn bare_map_document_is_accepted() {
    let (_dir, store) = store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(
        store.path(),
        r#"{"club":{"boardId":"club","version":4,"movies":[],"leaderMovieId":null}}"#,
    )
    .unwrap();
    assert_eq!(store.read(Some("club")).await.unwrap().version, 4);

    let next = store
        .replace(Some("club"), vec![movie(1, 1.0, 0.0)], Some(4))
        .await
        .unwrap();
    assert_eq!(next.version, 5);
}

#[tokio::test]
async fn corrupt_document_reads_as_empty() {
    let (_dir, store) = store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    for junk in ["{not json", "[1,2,3]", "\"boards\"", ""] {
        std::fs::write(store.path(), junk).unwrap();
        let state = store.read(None).await.unwrap();
        assert_eq!(state.version, 0, "{junk:?}");
    }
}

#[tokio::test]
async fn concurrent_writers_with_same_version_conflict_once() {
    let (_dir, store) = store();
    let store = std::sync::Arc::new(store);
    let mut handles = Vec::new();
    for id in 1..=8 {
        let store = std::sync::Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.replace(None, vec![movie(id, 1.0, 0.0)], Some(0)).await
        }));
    }
    let mut ok = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected {e}"),
        }
    }
    assert_eq!((ok, conflicts), (1, 7));
    assert_eq!(store.read(None).await.unwrap().version, 1);
}
