use super::*;

#[test]
fn public_paths_resolve_under_root() {
    let root = AssetRoot::new("/srv/public");
    assert_eq!(
        root.resolve("/VHS/templates/vhs-classic/sleeve-base.png")
            .unwrap(),
        PathBuf::from("/srv/public/VHS/templates/vhs-classic/sleeve-base.png")
    );
    assert_eq!(
        root.resolve("VHS\\a\\..\\b.png").unwrap(),
        PathBuf::from("/srv/public/VHS/b.png")
    );
    assert_eq!(
        root.resolve("./VHS//./c.png").unwrap(),
        PathBuf::from("/srv/public/VHS/c.png")
    );
}

#[test]
fn escaping_the_root_is_a_security_error() {
    let root = AssetRoot::new("/srv/public");
    for p in ["../etc/passwd", "/VHS/../../secret.png", "a/../../b", "C:/x.png"] {
        let err = root.resolve(p).unwrap_err();
        assert!(matches!(err, CoverError::Security(_)), "{p}: {err}");
    }
}

#[test]
fn empty_public_paths_are_validation_errors() {
    let root = AssetRoot::new("/srv/public");
    for p in ["", "   ", "/", "a/.."] {
        assert!(matches!(
            root.resolve(p).unwrap_err(),
            CoverError::Validation(_)
        ));
    }
}

#[test]
fn content_type_must_be_an_image() {
    assert!(check_content_type(Some("image/png")).is_ok());
    assert!(check_content_type(Some("IMAGE/JPEG; charset=binary")).is_ok());
    assert!(check_content_type(Some("text/html")).is_err());
    assert!(check_content_type(Some("image/")).is_err());
    assert!(check_content_type(Some("application/json")).is_err());
    assert!(check_content_type(None).is_err());
}

#[test]
fn remote_urls_need_http_scheme() {
    let root = AssetRoot::new("/srv");
    assert!(
        RenderSource::RemoteUrl("https://img.example/p.jpg".into())
            .validate(&root)
            .is_ok()
    );
    assert!(matches!(
        RenderSource::RemoteUrl("file:///etc/passwd".into())
            .validate(&root)
            .unwrap_err(),
        CoverError::Validation(_)
    ));
    assert!(matches!(
        RenderSource::RemoteUrl("not a url".into())
            .validate(&root)
            .unwrap_err(),
        CoverError::Validation(_)
    ));
}

#[test]
fn source_serde_is_externally_tagged_camel_case() {
    let s: RenderSource = serde_json::from_str(r#"{"publicPath":"/VHS/p.png"}"#).unwrap();
    assert_eq!(s, RenderSource::PublicPath("/VHS/p.png".into()));
    let s: RenderSource = serde_json::from_str(r#"{"remoteUrl":"https://x/y.jpg"}"#).unwrap();
    assert_eq!(s.kind(), "remote");
}

#[tokio::test]
async fn local_and_public_sources_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("VHS")).unwrap();
    std::fs::write(dir.path().join("VHS/p.bin"), b"abc").unwrap();
    let root = AssetRoot::new(dir.path());
    let client = build_http_client(Duration::from_secs(1)).unwrap();

    let public = RenderSource::PublicPath("/VHS/p.bin".into());
    assert_eq!(
        load_source_bytes(&public, &root, &client).await.unwrap(),
        b"abc"
    );

    let local = RenderSource::LocalFile(dir.path().join("VHS/p.bin"));
    assert_eq!(
        load_source_bytes(&local, &root, &client).await.unwrap(),
        b"abc"
    );

    let missing = RenderSource::LocalFile(dir.path().join("missing.png"));
    assert!(matches!(
        load_source_bytes(&missing, &root, &client)
            .await
            .unwrap_err(),
        CoverError::NotFound(_)
    ));
}

#[tokio::test]
async fn escape_is_rejected_before_io() {
    let root = AssetRoot::new("/definitely/not/here");
    let client = build_http_client(Duration::from_secs(1)).unwrap();
    let src = RenderSource::PublicPath("../../etc/passwd".into());
    assert!(matches!(
        load_source_bytes(&src, &root, &client).await.unwrap_err(),
        CoverError::Security(_)
    ));
}
