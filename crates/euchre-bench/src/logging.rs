use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

const EVENTS_FILE: &str = "events.jsonl";

/// Flushes the event log when dropped. Hold it until the run finishes.
pub struct LoggingGuard {
    _flush: WorkerGuard,
    pub events_path: PathBuf,
}

/// Engine and arena events land beside the summary table.
pub fn events_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(EVENTS_FILE)
}

/// `RUST_LOG` wins; otherwise the configured level, defaulting to info.
fn event_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = logging.level().unwrap_or(Level::INFO);
        EnvFilter::new(level.as_str())
    })
}

/// Routes `euchre_core` and `euchre_bench` events to a JSON-lines file when
/// structured logging is enabled. Returns `None` when it is not.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let events_path = events_path(outputs);
    if let Some(dir) = events_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory at {}", dir.display()))?;
    }
    let file = File::create(&events_path)
        .with_context(|| format!("creating event log at {}", events_path.display()))?;
    let (writer, flush) = NonBlockingBuilder::default().lossy(false).finish(file);

    let subscriber = fmt()
        .json()
        .with_env_filter(event_filter(logging))
        .with_current_span(false)
        .with_target(true)
        .with_writer(writer)
        .finish();

    // Tests may have installed a subscriber already.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard {
        _flush: flush,
        events_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(summary: &str) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: PathBuf::from("hands.jsonl"),
            summary_md: PathBuf::from(summary),
        }
    }

    #[test]
    fn events_sit_next_to_summary() {
        assert_eq!(
            events_path(&outputs("bench/out/run/summary.md")),
            PathBuf::from("bench/out/run/events.jsonl")
        );
        assert_eq!(
            events_path(&outputs("summary.md")),
            PathBuf::from("./events.jsonl")
        );
    }

    #[test]
    fn disabled_logging_installs_nothing() {
        let guard = init_logging(&LoggingConfig::default(), &outputs("x/summary.md"))
            .expect("disabled logging succeeds");
        assert!(guard.is_none());
    }
}
