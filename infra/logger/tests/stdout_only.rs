use mdesk_logger::{LevelFilter, Logger, SinkKind};

#[test]
fn init_stdout_only_has_no_guard() {
    let logger = Logger::builder()
        .name("integration-stdout-only")
        .stdout(true)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    assert_eq!(logger.attached(), Some(SinkKind::Stdout));
    assert!(logger.guard().is_none(), "stdout-only logger should not create a file guard");

    tracing::info!("console record, visible with --nocapture");
}
