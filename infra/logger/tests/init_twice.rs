use mdesk_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn init_twice_returns_subscriber_error() {
    let _logger = Logger::builder()
        .name("integration-init-twice")
        .stdout(true)
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("integration-init-twice-second")
        .stdout(true)
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init with a sink should fail");

    assert!(
        matches!(err, LoggerError::Subscriber { .. }),
        "expected subscriber error for second init"
    );

    let inert = Logger::builder()
        .name("integration-init-twice-inert")
        .init()
        .expect("sinkless init stays available after a global subscriber exists");
    assert!(inert.attached().is_none());
}
