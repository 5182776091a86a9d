use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Level used when neither `RUST_LOG`, `--log-level` nor the config file set one.
pub const DEFAULT_LEVEL: &str = "info";

/// Timestamp, coloured level, source location, then the event fields.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(writer, "{} ", Local::now().format("%H:%M:%S%.3f"))?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if *meta.level() >= Level::DEBUG {
            if let (Some(module), Some(line)) = (meta.module_path(), meta.line()) {
                write!(writer, "{module}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Picks the filter directive: `RUST_LOG` beats the command line, which beats
/// the config file.
pub fn resolve_directive(
    rust_log: Option<&str>,
    cli_level: Option<&str>,
    config_level: Option<&str>,
) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .or(cli_level)
        .or(config_level)
        .unwrap_or(DEFAULT_LEVEL)
        .to_string()
}

/// Initializes logging. Call once at startup.
///
/// Log lines go to stderr so that report and JSON output on stdout stay
/// machine-readable. With `log_file` set, the same lines are appended there
/// without colour.
pub fn init_logging(
    directive: &str,
    log_file: Option<&Path>,
) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log level '{directive}'"))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LocalFmt)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rust_log_wins() {
        assert_eq!(
            resolve_directive(Some("overtime_core=trace"), Some("warn"), Some("debug")),
            "overtime_core=trace"
        );
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        assert_eq!(resolve_directive(Some("  "), Some("warn"), None), "warn");
    }

    #[test]
    fn cli_beats_config() {
        assert_eq!(resolve_directive(None, Some("warn"), Some("debug")), "warn");
    }

    #[test]
    fn config_then_default() {
        assert_eq!(resolve_directive(None, None, Some("debug")), "debug");
        assert_eq!(resolve_directive(None, None, None), DEFAULT_LEVEL);
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let err = init_logging("overtime_core=notalevel", None).unwrap_err();

        assert!(err.to_string().contains("invalid log level"));
    }
}
