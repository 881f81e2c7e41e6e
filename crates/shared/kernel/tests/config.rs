use mdesk_domain::config::AppConfig;
use mdesk_kernel::config::load_config;
use std::io::Write;

#[test]
fn missing_file_yields_defaults() {
    let config: AppConfig = load_config(Some("does-not-exist")).expect("defaults apply");

    assert_eq!(config.server.port, 5000);
    assert!(!config.debug);
    assert!(!config.testing);
    assert_eq!(config.log.max_bytes, 10_240);
    assert_eq!(config.log.backup_count, 10);
    assert_eq!(config.auth.login_view, "login");
}

#[test]
fn file_settings_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut file = std::fs::File::create(dir.path().join("server.toml")).expect("config file");
    writeln!(
        file,
        r#"
env = "development"
debug = true

[mail]
server = "smtp.example.com"
default_sender = "Support <support@example.com>"

[tunnel]
enabled = true
"#
    )
    .expect("write config");

    let config: AppConfig = load_config(Some(dir.path().join("server"))).expect("config loads");

    assert!(config.env.is_development());
    assert!(config.debug);
    assert_eq!(config.mail.host(), Some("smtp.example.com"));
    assert!(config.tunnel.enabled);
    assert_eq!(config.server.port, 5000);
}
