use super::*;

#[test]
fn builtin_catalog_is_valid() {
    let reg = TemplateRegistry::builtin();
    TemplateRegistry::from_templates(reg.templates().to_vec()).unwrap();
    assert_eq!(reg.default_template_id(), DEFAULT_TEMPLATE_ID);
}

#[test]
fn lookup_falls_back_to_default() {
    let reg = TemplateRegistry::builtin();
    let default = reg.get_template_by_id(Some(DEFAULT_TEMPLATE_ID));
    assert_eq!(reg.get_template_by_id(None), default);
    assert_eq!(reg.get_template_by_id(Some("nonexistent-id")), default);
    assert_eq!(
        reg.get_template_by_id(Some("black-case-front")).id,
        "black-case-front"
    );
}

#[test]
fn empty_catalog_is_a_config_error() {
    assert!(matches!(
        TemplateRegistry::from_templates(vec![]),
        Err(CoverError::Config(_))
    ));
}

#[test]
fn duplicate_ids_are_rejected() {
    let t = TemplateRegistry::builtin().default_template().clone();
    let err = TemplateRegistry::from_templates(vec![t.clone(), t]).unwrap_err();
    assert!(err.to_string().contains("duplicate template id"));
}

#[test]
fn listing_reports_overlay_counts() {
    let listing = TemplateRegistry::builtin().listing();
    assert_eq!(listing.default_template_id, DEFAULT_TEMPLATE_ID);
    assert_eq!(listing.templates.len(), 2);
    assert_eq!(listing.templates[0].overlay_count, 3);
    assert_eq!(listing.templates[1].overlay_count, 2);

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["defaultTemplateId"], DEFAULT_TEMPLATE_ID);
    assert_eq!(json["templates"][1]["overlayCount"], 2);
}

#[test]
fn custom_catalog_loads_from_wrapped_and_bare_json() {
    let dir = tempfile::tempdir().unwrap();
    let t = serde_json::json!({
        "id": "custom",
        "name": "Custom",
        "output": {"width": 100, "height": 150},
        "poster": {"left": 10, "top": 10, "width": 80, "height": 120}
    });

    let wrapped = dir.path().join("wrapped.json");
    std::fs::write(&wrapped, serde_json::json!({"templates": [t.clone()]}).to_string()).unwrap();
    let reg = TemplateRegistry::from_json_path(&wrapped).unwrap();
    assert_eq!(reg.default_template_id(), "custom");

    let bare = dir.path().join("bare.json");
    std::fs::write(&bare, serde_json::json!([t]).to_string()).unwrap();
    let reg = TemplateRegistry::from_json_path(&bare).unwrap();
    assert_eq!(reg.get_template_by_id(Some("nope")).id, "custom");

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    assert!(matches!(
        TemplateRegistry::from_json_path(&empty),
        Err(CoverError::Config(_))
    ));
}
