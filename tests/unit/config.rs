use super::*;

#[test]
fn empty_object_uses_defaults() {
    let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.fetch_timeout(), Duration::from_secs(15));
}

#[test]
fn camel_case_fields_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(
        &path,
        r#"{"assetRoot":"/srv/www","fetchTimeoutSecs":3,"overlayCacheCapacity":64}"#,
    )
    .unwrap();
    let cfg = EngineConfig::from_path(&path).unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("/srv/www"));
    assert_eq!(cfg.fetch_timeout_secs, 3);
    assert_eq!(cfg.overlay_cache_capacity, Some(64));
    assert_eq!(cfg.board_path, PathBuf::from("data/boards.json"));
}

#[test]
fn bad_files_are_config_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    for body in [
        "{nope",
        r#"{"unknownField":1}"#,
        r#"{"fetchTimeoutSecs":0}"#,
        r#"{"overlayCacheCapacity":0}"#,
    ] {
        std::fs::write(&path, body).unwrap();
        assert!(
            matches!(
                EngineConfig::from_path(&path).unwrap_err(),
                CoverError::Config(_)
            ),
            "{body}"
        );
    }
}

#[test]
fn builtin_registry_unless_a_catalog_is_given() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.load_registry().unwrap().default_template_id(), "vhs-classic");

    let cfg = EngineConfig {
        templates_path: Some(PathBuf::from("/definitely/missing.json")),
        ..EngineConfig::default()
    };
    assert!(cfg.load_registry().is_err());
}

#[test]
fn renderer_and_store_follow_paths() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = EngineConfig {
        asset_root: dir.path().join("public"),
        board_path: dir.path().join("boards.json"),
        ..EngineConfig::default()
    };
    let renderer = cfg.build_renderer().unwrap();
    assert_eq!(renderer.assets().path(), dir.path().join("public"));
    assert_eq!(cfg.board_store().path(), dir.path().join("boards.json"));
}
