use crate::config::LoggingConfig;
use anyhow::Result;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events the default filter lets through.
const EMISSIONS_TARGETS: [&str; 3] = [
    "emissions_rewards",
    "emissions_storage",
    "emissions_types",
];

/// Build the event filter: `RUST_LOG` wins, otherwise the configured level
/// for the emissions crates plus any per-module directives.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        EMISSIONS_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, config.level))
            .collect::<Vec<_>>()
            .join(",")
    });

    let mut filter = EnvFilter::try_new(base)?;
    for (module, level) in &config.module_filters {
        filter = filter.add_directive(format!("{}={}", module, level).parse()?);
    }
    Ok(filter)
}

/// Initialize the logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let subscriber = tracing_subscriber::registry().with(filter);

    let file = match &config.file_output {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    match config.format.as_str() {
        "json" => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_line_number(true)
                .with_file(true);
            let file_layer = file.map(|f| {
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
            });
            subscriber.with(json_layer).with(file_layer).try_init()?;
        }
        "compact" => {
            let compact_layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_line_number(false)
                .with_file(false);
            let file_layer = file.map(|f| {
                fmt::layer()
                    .compact()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
            });
            subscriber.with(compact_layer).with(file_layer).try_init()?;
        }
        _ => {
            // Source locations only help when chasing debug output
            let show_location = matches!(config.level.as_str(), "debug" | "trace");
            let pretty_layer = fmt::layer()
                .with_target(show_location)
                .with_line_number(show_location)
                .with_file(show_location);
            let file_layer = file.map(|f| {
                fmt::layer()
                    .with_writer(Mutex::new(f))
                    .with_ansi(false)
            });
            subscriber.with(pretty_layer).with(file_layer).try_init()?;
        }
    }

    Ok(())
}
