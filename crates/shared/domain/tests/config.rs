use mdesk_domain::config::{
    AppConfig, DatabaseConfig, Environment, LogConfig, MailConfig, ServerConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 5000);

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "mdesk");
    assert_eq!(db.database, "core");
    assert!(db.credentials.is_some());

    let mail = MailConfig::default();
    assert!(mail.host().is_none());
    assert_eq!(mail.port, 25);
    assert!(!mail.use_tls);

    let log = LogConfig::default();
    assert!(!log.to_stdout);
    assert_eq!(log.dir, std::path::PathBuf::from("logs"));
    assert_eq!(log.max_bytes, 10_240);
    assert_eq!(log.backup_count, 10);

    let cfg = AppConfig::default();
    assert_eq!(cfg.env, Environment::Production);
    assert!(!cfg.debug);
    assert!(!cfg.testing);
    assert_eq!(cfg.auth.login_view, "login");
    assert!(!cfg.tunnel.enabled);
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "env": "development",
        "debug": true,
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "mem://", "namespace": "n", "database": "d", "credentials": null },
        "mail": { "server": "smtp.example.com", "port": 587, "use_tls": true, "default_sender": "ops@example.com" },
        "log": { "to_stdout": true }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.env, Environment::Development);
    assert!(cfg.debug);
    assert!(!cfg.testing);
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.mail.host(), Some("smtp.example.com"));
    assert_eq!(cfg.mail.port, 587);
    assert!(cfg.mail.use_tls);
    assert!(cfg.log.to_stdout);
    assert_eq!(cfg.log.max_bytes, 10_240);
}

#[test]
fn mail_host_treats_empty_as_unset() {
    let mail = MailConfig { server: Some(String::new()), ..MailConfig::default() };
    assert!(mail.host().is_none());

    let mail = MailConfig { server: Some("smtp.example.com".to_owned()), ..MailConfig::default() };
    assert_eq!(mail.host(), Some("smtp.example.com"));
}

#[test]
fn mail_credentials_pair_when_either_half_present() {
    let base = MailConfig::default();
    assert!(base.credentials().is_none());

    let both_empty = MailConfig {
        username: Some(String::new()),
        password: Some(String::new()),
        ..MailConfig::default()
    };
    assert!(both_empty.credentials().is_none());

    let user_only = MailConfig { username: Some("support".to_owned()), ..MailConfig::default() };
    assert_eq!(user_only.credentials(), Some(("support".to_owned(), String::new())));

    let pass_only = MailConfig { password: Some("secret".to_owned()), ..MailConfig::default() };
    assert_eq!(pass_only.credentials(), Some((String::new(), "secret".to_owned())));

    let both = MailConfig {
        username: Some("support".to_owned()),
        password: Some("secret".to_owned()),
        ..MailConfig::default()
    };
    assert_eq!(both.credentials(), Some(("support".to_owned(), "secret".to_owned())));
}

#[test]
fn config_is_cheap_to_clone_and_mutable_on_write() {
    let mut cfg = AppConfig::default();
    let snapshot = cfg.clone();

    cfg.debug = true;
    assert!(cfg.debug);
    assert!(!snapshot.debug);
}
