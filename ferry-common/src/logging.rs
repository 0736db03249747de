use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:tt)*) => {{
        let span = $crate::tracing::span!($level, $span);
        let _enter = span.enter();

        $crate::tracing::event!($level, $($msg)*)
    }};
}

/// Events about the local delivery machinery itself (ledger and queue
/// bookkeeping), as opposed to what the remote exchanger said.
#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::internal!(level = TRACE, $($msg)*)
    };
}

/// Events describing how a remote exchanger's answer was handled.
#[macro_export]
macro_rules! remote {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "remote", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::remote!(level = TRACE, $($msg)*)
    };
}

fn level_from(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    value.map_or(default, |level| {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    })
}

/// Install the global subscriber.
///
/// The level comes from `LOG_LEVEL`, falling back to `TRACE` for debug
/// builds and `INFO` otherwise. Only events from `ferry` crates are kept.
pub fn init() {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    let level = level_from(std::env::var("LOG_LEVEL").ok().as_deref(), default);

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("ferry")
                })),
        )
        .init();
}
