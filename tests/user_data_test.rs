use folio::error::Error;
use folio::user_data::UserData;
use tempfile::TempDir;

#[test]
fn test_parse_json_keeps_field_order() {
    let data = UserData::parse(r#"{"skills": "Rust", "name": "Ada", "about": "Engineer"}"#).unwrap();
    let keys: Vec<&str> = data.fields().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["skills", "name", "about"]);
    assert_eq!(data.to_json().unwrap(), r#"{"skills":"Rust","name":"Ada","about":"Engineer"}"#);
}

#[test]
fn test_parse_yaml() {
    let data = UserData::parse(
        "name: Ada\ntechStacks:\n  - Rust\n  - TypeScript\nprojects:\n  - title: Engine\n    repoOrSiteLink: https://example.com\n",
    )
    .unwrap();
    assert_eq!(data.name().as_deref(), Some("Ada"));
    assert_eq!(data.field_text("techStacks").as_deref(), Some("Rust, TypeScript"));
}

#[test]
fn test_missing_fields_are_valid() {
    assert!(UserData::parse("{}").is_ok());
}

#[test]
fn test_wrong_types_are_rejected() {
    let err = UserData::parse(r#"{"name": 42}"#).unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    let err = UserData::parse(r#"{"projects": [{"description": "no title"}]}"#).unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    let err = UserData::parse(r#"{"experiences": [{"companyName": "ACME"}]}"#).unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));
}

#[test]
fn test_not_a_mapping() {
    assert!(matches!(UserData::parse("- a\n- b\n"), Err(Error::ValidationError(_))));
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user.json");
    std::fs::write(&path, r#"{"name": "Ada", "skills": ["Rust"]}"#).unwrap();

    let data = UserData::load(&path).unwrap();
    assert_eq!(data.field_text("skills").as_deref(), Some("Rust"));

    assert!(matches!(UserData::load(dir.path().join("missing.json")), Err(Error::IoError(_))));
}
