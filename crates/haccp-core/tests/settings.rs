use haccp_core::{ai_configured, read_settings, settings_dir, write_settings, AiSettings};

// One test touches HACCP_HOME so the process environment is never shared.
#[test]
fn settings_roundtrip_under_haccp_home() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("profile");
    std::env::set_var("HACCP_HOME", &home);
    assert_eq!(settings_dir(), home);

    let missing = read_settings();
    assert!(missing.provider.is_empty());
    assert!(!ai_configured(&missing));

    let settings = AiSettings {
        provider: "anthropic".into(),
        api_key: "sk-test".into(),
        model: "claude-sonnet-4-5".into(),
    };
    write_settings(&settings).unwrap();
    let raw = std::fs::read_to_string(home.join("settings.json")).unwrap();
    assert!(raw.contains("\"apiKey\""));

    let back = read_settings();
    assert_eq!(back.provider, "anthropic");
    assert_eq!(back.api_key, "sk-test");
    assert!(ai_configured(&back));

    std::fs::write(home.join("settings.json"), "{ not json").unwrap();
    assert!(read_settings().model.is_empty());

    std::env::remove_var("HACCP_HOME");
}
