use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals.
    #[default]
    Compact,
    /// One JSON object per event, for scheduled runs whose output is collected.
    Json,
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "job_market_report=debug,info"
    } else {
        "job_market_report=info"
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Logs go to stderr; stdout carries only the report.
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json().flatten_event(true)).init(),
    }
}
