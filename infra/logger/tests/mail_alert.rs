use mdesk_logger::{AlertMessage, AlertTransport, Logger, LoggerError, MailAlertConfig, SinkKind};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone)]
struct RecordingTransport {
    delivered: Arc<Mutex<Vec<AlertMessage>>>,
}

impl RecordingTransport {
    fn delivered(&self) -> Vec<AlertMessage> {
        self.delivered.lock().expect("alert transport poisoned").clone()
    }
}

impl AlertTransport for RecordingTransport {
    fn deliver(&self, alert: &AlertMessage) -> Result<(), LoggerError> {
        self.delivered.lock().expect("alert transport poisoned").push(alert.clone());
        Ok(())
    }
}

fn alert_config() -> MailAlertConfig {
    MailAlertConfig {
        host: "localhost".to_owned(),
        port: 2525,
        use_tls: false,
        credentials: None,
        from: "server@example.com".to_owned(),
        to: "admin@example.com".to_owned(),
        subject: "Support Mail Failure".to_owned(),
    }
}

#[test]
fn error_records_become_mail_alerts() {
    let transport = RecordingTransport::default();

    let logger = Logger::builder()
        .name("integration-mail-alert")
        .mail_alert(alert_config())
        .alert_transport(Box::new(transport.clone()))
        .init()
        .expect("logger should initialize");
    assert_eq!(logger.attached(), Some(SinkKind::MailAlert));

    tracing::info!("routine record, no alert expected");
    tracing::error!("delivery to customer failed");

    // Dropping the handle drains the alert queue before the worker stops.
    drop(logger);

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 1, "exactly the error record should alert");
    assert_eq!(delivered[0].subject, "Support Mail Failure");
    assert_eq!(delivered[0].to, "admin@example.com");
    assert!(delivered[0].body.contains("delivery to customer failed"));
}
