use mdesk::domain::config::{AppConfig, Environment};
use mdesk::features::auth::Auth;
use mdesk::features::theme::Theme;
use mdesk_server::{App, alert_envelope, tunnel_requested};

fn testing_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.testing = true;
    config.database.credentials = None;
    config
}

#[test]
fn tunnel_opens_only_in_development_with_the_flag() {
    let mut config = AppConfig::default();
    assert!(!tunnel_requested(&config), "production, flag unset");

    config.tunnel.enabled = true;
    assert!(!tunnel_requested(&config), "production, flag set");

    config.env = Environment::Development;
    config.tunnel.enabled = false;
    assert!(!tunnel_requested(&config), "development, flag unset");

    config.tunnel.enabled = true;
    assert!(tunnel_requested(&config), "development, flag set");

    config.env = Environment::Staging;
    assert!(!tunnel_requested(&config), "staging, flag set");
}

#[tokio::test]
async fn bootstrap_is_repeatable_under_testing() {
    for _ in 0..2 {
        let app = App::builder().config(testing_config()).build().await.expect("bootstrap");

        assert!(app.sink().is_none());
        assert!(app.tunnel_url().is_none());
        assert!(app.state().get_slice::<Theme>().is_some());
        assert!(app.state().get_slice::<Auth>().is_some());
    }
}

#[tokio::test]
async fn debug_mode_attaches_no_sink() {
    let mut config = AppConfig::default();
    config.debug = true;
    config.database.credentials = None;
    config.log.to_stdout = true;
    config.mail.server = Some("smtp.example.com".to_owned());
    config.mail.default_sender = "support@example.com".to_owned();

    let app = App::builder().config(config).build().await.expect("bootstrap");

    assert!(app.sink().is_none());
    assert!(app.state().mailer.is_some());
}

#[test]
fn alert_envelope_fixes_the_report_addresses() {
    let mut config = AppConfig::default();
    config.mail.server = Some("smtp.example.com".to_owned());
    config.mail.default_sender = "support@example.com".to_owned();

    let envelope = alert_envelope(&config).expect("mail server is set");

    assert_eq!(envelope.host, "smtp.example.com");
    assert_eq!(envelope.from, "noreply@smtp.example.com");
    assert_eq!(envelope.to, "support@example.com");
    assert_eq!(envelope.subject, "MailDesk Failure");
}

#[test]
fn alert_envelope_requires_a_mail_server() {
    let config = AppConfig::default();

    assert!(alert_envelope(&config).is_err());
}

#[tokio::test]
async fn builder_validation_rejects_zero_backups() {
    let mut config = testing_config();
    config.log.backup_count = 0;

    assert!(App::builder().config(config).build().await.is_err());
}

#[tokio::test]
async fn builder_validation_requires_a_sender_with_mail() {
    let mut config = testing_config();
    config.mail.server = Some("smtp.example.com".to_owned());
    config.mail.default_sender = String::new();

    assert!(App::builder().config(config).build().await.is_err());
}
