use mdesk_logger::{LevelFilter, Logger};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn file_logging_rotates_by_size() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("integration-rotation")
        .level(LevelFilter::INFO)
        .file(&log_dir)
        .max_bytes(512)
        .backup_count(2)
        .init()?;

    for i in 0..64 {
        tracing::info!("rotation filler record number {i}");
    }

    std::thread::sleep(Duration::from_millis(50));
    drop(logger);

    let base = log_dir.join("integration-rotation.log");
    let first_backup = log_dir.join("integration-rotation.log.1");

    assert!(base.exists());
    assert!(first_backup.exists(), "enough records should force at least one rotation");
    assert!(
        !log_dir.join("integration-rotation.log.3").exists(),
        "backups beyond the configured count are discarded"
    );

    for path in [&base, &first_backup] {
        let len = fs::metadata(path)?.len();
        assert!(len <= 512, "{} exceeds the rotation threshold: {len}", path.display());
    }

    Ok(())
}
