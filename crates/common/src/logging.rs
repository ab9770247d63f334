use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Targets that log at [`queries`](crate::config::Logging::queries) level.
const QUERY_TARGETS: [&str; 3] = ["sqlx", "sea_orm", "hyper"];

/// Install the global [`tracing`](tracing_core) subscriber configured from [`Config`].
pub fn init(config: &Config) {
    let fmt = fmt::format().with_target(false).compact();

    let target_filters = QUERY_TARGETS
        .into_iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(target, config.logging.queries)
        })
        .with_default(config.logging.level);

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(fmt))
        .with(target_filters)
        .init();
}
