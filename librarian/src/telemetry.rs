use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder,
};

use crate::config::Config;

pub static RECOMMENDATIONS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "librarian_recommendations_total",
        "Recommendations returned to callers"
    )
    .expect("metric can be registered")
});

pub static RETRIEVAL_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "librarian_retrieval_failures_total",
        "Queries that failed because the vector search could not be used"
    )
    .expect("metric can be registered")
});

pub static SELECTION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "librarian_selection_fallbacks_total",
        "Selections that fell back to the top-ranked candidate"
    )
    .expect("metric can be registered")
});

pub static TITLE_MISSES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "librarian_title_misses_total",
        "Chosen titles with no entry in the knowledge store"
    )
    .expect("metric can be registered")
});

pub static RECOMMEND_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "librarian_recommend_seconds",
        "Wall time of a full recommend call"
    )
    .expect("metric can be registered")
});

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
pub fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn render_metrics() -> (Vec<u8>, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    (buffer, encoder.format_type().to_string())
}
