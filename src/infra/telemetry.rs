//! Tracing subscriber setup and metric registration.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Legal pages rendered for a language that has no variant. Labelled by `document`.
pub const LANGUAGE_MISS_METRIC: &str = "quire_document_language_miss_total";
/// Pages rendered, labelled by `kind` (`index`, `article`, `legal`).
pub const PAGE_RENDER_METRIC: &str = "quire_page_render_total";

static METRICS_DESCRIBED: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` directives refine the configured level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("tracing subscriber already set: {err}")))
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

fn describe_metrics() {
    METRICS_DESCRIBED.call_once(|| {
        describe_counter!(
            LANGUAGE_MISS_METRIC,
            Unit::Count,
            "Localized pages rendered for a language without a matching variant."
        );
        describe_counter!(PAGE_RENDER_METRIC, Unit::Count, "Pages rendered, by kind.");
    });
}
