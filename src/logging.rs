// src/logging.rs

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;

/// A timer that outputs nothing but still enables span timing calculation
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(
        &self,
        _w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

static INIT: Once = Once::new();

/// Install a stderr subscriber if `QUILL_LOG` is set. Safe to call repeatedly.
///
/// `QUILL_LOG` takes an `EnvFilter` directive (e.g. `quill_codegen=trace`).
/// `QUILL_LOG_STYLE`: "compact" (default, no timestamps) or "full".
pub fn init_tracing() {
    INIT.call_once(|| {
        let Ok(filter) = EnvFilter::try_from_env("QUILL_LOG") else {
            return;
        };
        let style = std::env::var("QUILL_LOG_STYLE").unwrap_or_default();
        let installed = if style == "full" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .try_init()
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_level(true)
                .with_timer(NoTimestamp)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_writer(std::io::stderr)
                .try_init()
        };
        // Another subscriber may already own the global slot (e.g. in tests).
        if installed.is_ok() {
            tracing::debug!("tracing initialized");
        }
    });
}
