use mdesk::domain::config::AppConfig;
use mdesk_logger::SinkKind;
use mdesk_server::App;

// Installs the global subscriber, so this file holds exactly one test.
#[tokio::test]
async fn production_defaults_attach_the_rotating_file_sink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_dir = dir.path().join("logs");

    let mut config = AppConfig::default();
    config.database.credentials = None;
    config.log.dir.clone_from(&log_dir);

    let app = App::builder().config(config).build().await.expect("bootstrap");

    assert_eq!(app.sink(), Some(SinkKind::RotatingFile));
    assert!(log_dir.is_dir(), "log directory is created when missing");

    // Dropping the app flushes the background writer.
    drop(app);

    let contents = std::fs::read_to_string(log_dir.join("maildesk.log")).expect("log file");
    assert!(contents.contains("MailDesk startup"), "startup record missing: {contents}");
}
