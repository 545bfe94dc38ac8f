#![allow(clippy::unwrap_used)]
// Config file and token store tests against a temporary directory.

use upwatch_config::{
    Config, FileTokenStore, Profile, TokenStoreKind, load_config_from, save_config_to,
};
use upwatch_core::{AuthToken, TokenStore};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();

    assert_eq!(cfg.active_profile_name(), "default");
    assert_eq!(cfg.defaults.output, "table");
    assert_eq!(cfg.defaults.timeout, 30);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn save_then_load_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");

    let mut cfg = Config::default();
    cfg.default_profile = Some("work".into());
    cfg.profiles.insert(
        "work".into(),
        Profile {
            server: "https://status.example.com".into(),
            username: Some("admin".into()),
            token_store: TokenStoreKind::Keyring,
            refresh_interval: Some(10),
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.active_profile_name(), "work");
    let work = &loaded.profiles["work"];
    assert_eq!(work.server, "https://status.example.com");
    assert_eq!(work.username.as_deref(), Some("admin"));
    assert_eq!(work.token_store, TokenStoreKind::Keyring);
    assert_eq!(work.refresh_interval, Some(10));
}

#[test]
fn reads_hand_written_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
server = "http://localhost:3000"
password_env = "HOME_MONITOR_PW"
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.refresh_interval, 30);
    let home = &cfg.profiles["home"];
    assert_eq!(home.password_env.as_deref(), Some("HOME_MONITOR_PW"));
    assert_eq!(home.token_store, TokenStoreKind::File);
}

#[test]
fn file_token_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTokenStore::for_profile(&dir.path().join("config.toml"), "default");

    assert!(store.load().unwrap().is_none());

    store.save(&AuthToken::new("jwt-abc")).unwrap();
    assert_eq!(store.load().unwrap().unwrap().expose(), "jwt-abc");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    // clearing twice is fine
    store.clear().unwrap();
}
