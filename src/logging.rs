use std::fs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn setup_logging() -> anyhow::Result<()> {
    fs::create_dir_all("logs")?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|f| f.to_lowercase() == "json")
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(true),
            )
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}

#[macro_export]
macro_rules! log_request_start {
    ($request_type:expr, $details:expr) => {
        tracing::info!(
            request_type = $request_type,
            details = $details,
            "📥 handling {} request: {}",
            $request_type,
            $details
        );
    };
}

#[macro_export]
macro_rules! log_request_complete {
    ($request_type:expr, $latency_ms:expr, $success:expr) => {
        let emoji = if $success { "✅" } else { "❌" };
        tracing::info!(
            request_type = $request_type,
            latency_ms = $latency_ms,
            success = $success,
            "{} {} request completed in {:.0}ms",
            emoji,
            $request_type,
            $latency_ms
        );
    };
}

#[macro_export]
macro_rules! log_circuit_state_change {
    ($from:expr, $to:expr, $reason:expr) => {
        tracing::warn!(
            from_state = $from,
            to_state = $to,
            reason = $reason,
            "🔌 circuit breaker {} -> {} ({})",
            $from,
            $to,
            $reason
        );
    };
}

#[macro_export]
macro_rules! log_cache_event {
    ($event:expr, $key:expr) => {
        tracing::debug!(event = $event, cache_key = $key, "🗄️ cache {}", $event);
    };
}
