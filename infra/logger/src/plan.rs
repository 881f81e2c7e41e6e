//! Sink selection, kept pure so every runtime-mode combination is testable
//! without touching the global dispatcher.

/// Which error-report sink a runtime mode gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// SMTP alerts for error-level events.
    MailAlert,
    /// Informational console stream on standard output.
    Stdout,
    /// Size-bounded rotating file under the log directory.
    RotatingFile,
}

/// Flags that drive sink selection, detached from any live handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkContext {
    pub debug: bool,
    pub testing: bool,
    pub mail_configured: bool,
    pub log_to_stdout: bool,
}

/// Decides which sink, if any, the current runtime mode gets.
///
/// Debug and testing runs get none. Otherwise exactly one sink: the mail
/// alert sink when a mail server is configured, else stdout when requested,
/// else the rotating file sink.
#[must_use]
pub const fn resolve(ctx: SinkContext) -> Option<SinkKind> {
    if ctx.debug || ctx.testing {
        return None;
    }
    if ctx.mail_configured {
        return Some(SinkKind::MailAlert);
    }
    if ctx.log_to_stdout {
        return Some(SinkKind::Stdout);
    }
    Some(SinkKind::RotatingFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(debug: bool, testing: bool, mail: bool, stdout: bool) -> SinkContext {
        SinkContext { debug, testing, mail_configured: mail, log_to_stdout: stdout }
    }

    #[test]
    fn debug_or_testing_selects_nothing() {
        for mail in [false, true] {
            for stdout in [false, true] {
                assert_eq!(resolve(ctx(true, false, mail, stdout)), None);
                assert_eq!(resolve(ctx(false, true, mail, stdout)), None);
                assert_eq!(resolve(ctx(true, true, mail, stdout)), None);
            }
        }
    }

    #[test]
    fn mail_server_wins_over_other_flags() {
        assert_eq!(resolve(ctx(false, false, true, false)), Some(SinkKind::MailAlert));
        assert_eq!(resolve(ctx(false, false, true, true)), Some(SinkKind::MailAlert));
    }

    #[test]
    fn stdout_flag_without_mail_selects_stdout() {
        assert_eq!(resolve(ctx(false, false, false, true)), Some(SinkKind::Stdout));
    }

    #[test]
    fn default_production_mode_selects_rotating_file() {
        assert_eq!(resolve(ctx(false, false, false, false)), Some(SinkKind::RotatingFile));
    }
}
