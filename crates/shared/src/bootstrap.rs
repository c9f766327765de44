use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize dotenvy
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(service_name: &str) -> String {
    format!("info,{}=debug,teamcal_core=debug", service_name.replace('-', "_"))
}

/// Log file name for a service started at the current local time
pub fn log_file_name(service_name: &str) -> String {
    let now = chrono::Local::now().format("%y-%m-%d-%H-%M-%S").to_string();
    format!("teamcal-{}.log.{}.jsonl", service_name, now)
}

/// Initialize tracing with stdout and file logging
///
/// The returned guard must stay alive for buffered file logs to be flushed.
pub fn init_tracing(service_name: &str) -> tracing_appender::non_blocking::WorkerGuard {
    // If LOG_DIR is set, use it. Default to "logs/app"
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs/app".to_string());

    let file_appender = tracing_appender::rolling::never(&log_dir, log_file_name(service_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(service_name).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_crate_target() {
        assert_eq!(
            default_filter("teamcal-api"),
            "info,teamcal_api=debug,teamcal_core=debug"
        );
    }

    #[test]
    fn test_log_file_name() {
        let name = log_file_name("api");
        assert!(name.starts_with("teamcal-api.log."));
        assert!(name.ends_with(".jsonl"));
    }
}
