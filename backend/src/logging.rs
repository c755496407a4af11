// Logging module, powered by tracing-subscriber
//
// The library crates log through the `log` facade. `tracing_log::LogTracer`
// routes those records into the tracing subscriber installed here.
// Console output goes to stderr; stdout carries command results.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use widecol_configs::LoggingSettings;

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the base level, noisy-crate overrides, and
/// optional per-target overrides from config.
fn build_env_filter(
    level: &str,
    target_levels: Option<&HashMap<String, String>>,
) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    // RocksDB bindings are chatty at debug
    let noisy: &[(&str, &str)] = &[("rocksdb", "warn"), ("librocksdb_sys", "warn")];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    // Per-target overrides from widecol.toml
    if let Some(map) = target_levels {
        let mut targets: Vec<_> = map.iter().collect();
        targets.sort();
        for (target, lvl) in targets {
            directives.push(format!("{}={}", target, lvl));
        }
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

fn fmt_layer<S, W>(
    format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_writer(writer)
            .with_target(true)
            .with_thread_names(true)
            .boxed(),
    }
}

/// Initialize logging based on configuration.
///
/// Sets up `tracing-subscriber` with:
///  - a console layer on stderr (when `log_to_console` is true)
///  - a file layer (when `file_path` is set)
///  - the `tracing_log::LogTracer` bridge so that all `log::*` calls are captured
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let log_format = LogFormat::parse(&settings.format);
    let targets = Some(&settings.targets);

    // Bridge `log` crate → tracing
    tracing_log::LogTracer::init().ok(); // ok() in case already initialized

    let console_layer = if settings.log_to_console {
        Some(
            fmt_layer(log_format, std::io::stderr, true)
                .with_filter(build_env_filter(&settings.level, targets)?),
        )
    } else {
        None
    };

    let file_layer = match &settings.file_path {
        Some(file_path) => {
            if let Some(parent) = Path::new(file_path).parent() {
                fs::create_dir_all(parent)?;
            }
            let log_file = OpenOptions::new().create(true).append(true).open(file_path)?;
            Some(
                fmt_layer(log_format, log_file, false)
                    .with_filter(build_env_filter(&settings.level, targets)?),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::trace!(
        "Logging initialized: level={}, console={}, file={:?}",
        settings.level,
        settings.log_to_console,
        settings.file_path
    );

    Ok(())
}
