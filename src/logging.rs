use crate::config::Environment;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Filter used when `RUST_LOG` is not set
fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "siteplan_backend=debug,tower_http=debug,sqlx=warn,info",
        Environment::Staging => "siteplan_backend=debug,tower_http=info,sqlx=warn,info",
        Environment::Prod => "siteplan_backend=info,tower_http=info,sqlx=error,warn",
    }
}

pub fn init_logging(env: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    // Closing spans carry their busy/idle time, which is how slow store calls show up in dev
    let span_events = if env.is_dev() {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev())
        .with_span_events(span_events);

    match env {
        Environment::Prod => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .init(),
        Environment::Staging => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.compact())
            .init(),
        Environment::Dev => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init(),
    }

    tracing::info!(?env, "Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_parse() {
        for env in [Environment::Dev, Environment::Staging, Environment::Prod] {
            assert!(default_filter(&env).parse::<EnvFilter>().is_ok());
        }
    }
}
