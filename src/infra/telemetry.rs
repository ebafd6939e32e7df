use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

/// Filter submissions, labelled `outcome` = `redirect` | `rejected`.
pub const METRIC_FILTER_SUBMISSIONS_TOTAL: &str = "devjobs_filter_submissions_total";
/// Listing store latency, labelled `query` = `distinct_locations` | `approved_jobs`.
pub const METRIC_LISTING_QUERY_MS: &str = "devjobs_listing_query_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber: `RUST_LOG` directives over the configured level,
/// span-trace capture for errors, then the configured output format.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    tracing_subscriber::registry()
        .with(env_filter(logging.level))
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    match format {
        // One object per line with event fields at the top level and the request span
        // (request id, method, path) alongside.
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    }
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_FILTER_SUBMISSIONS_TOTAL,
            Unit::Count,
            "Filter form submissions by outcome."
        );
        describe_histogram!(
            METRIC_LISTING_QUERY_MS,
            Unit::Milliseconds,
            "Listing store query latency by query."
        );
    });
}
