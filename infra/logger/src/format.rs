use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Fixed record format for the rotating file sink:
/// `<timestamp> <LEVEL>: <message> [in <source-path>:<line>]`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SupportFormat;

impl<S, N> FormatEvent<S, N> for SupportFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(writer, "{} {}: ", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"), meta.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        match (meta.file(), meta.line()) {
            (Some(file), Some(line)) => write!(writer, " [in {file}:{line}]")?,
            (Some(file), None) => write!(writer, " [in {file}]")?,
            _ => {}
        }
        writeln!(writer)
    }
}
