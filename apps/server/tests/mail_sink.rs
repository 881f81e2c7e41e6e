use mdesk::domain::config::AppConfig;
use mdesk_logger::SinkKind;
use mdesk_server::App;

// Installs the global subscriber, so this file holds exactly one test.
#[tokio::test]
async fn production_mail_server_attaches_the_alert_sink() {
    let mut config = AppConfig::default();
    config.database.credentials = None;
    config.mail.server = Some("smtp.example.com".to_owned());
    config.mail.default_sender = "support@example.com".to_owned();

    let app = App::builder().config(config).build().await.expect("bootstrap");

    assert_eq!(app.sink(), Some(SinkKind::MailAlert));
    assert!(app.state().mailer.is_some(), "mail extension bound alongside the sink");
    assert!(app.tunnel_url().is_none(), "no tunnel outside development");
}
