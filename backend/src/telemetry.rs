//! Logging and trace export for the monitor.
//!
//! Logs always go to stdout through the fmt layer. Spans are additionally
//! shipped over OTLP/gRPC when `OTEL_EXPORTER_OTLP_ENDPOINT` is configured,
//! tagged with the monitor's clustering and paging settings so traces from
//! differently tuned deployments can be told apart.

use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Service name reported to the trace collector.
pub const SERVICE_NAME: &str = "ap-monitor";

/// Filter used when `RUST_LOG` is not set. Per-query sqlx logs are noisy
/// because every map draw issues one radius query per seed.
fn default_filter(log_level: &str) -> String {
    format!(
        "ap_monitor_backend={},tower_http=info,sqlx::query=warn",
        log_level
    )
}

/// Install the global subscriber.
///
/// The returned guard, when present, must live until shutdown so buffered
/// spans reach the collector.
pub fn init_tracing(config: &Config) -> Result<Option<OtelGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.log_level).into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let Some(endpoint) = config.otel_endpoint.as_deref() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        return Ok(None);
    };

    let provider = tracer_provider(endpoint, service_resource(config))?;
    let otel_layer = {
        use opentelemetry::trace::TracerProvider;
        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    tracing::info!(otel_endpoint = endpoint, "Exporting spans over OTLP");
    Ok(Some(OtelGuard { provider }))
}

/// Resource attributes attached to every exported span.
fn service_resource(config: &Config) -> Resource {
    Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", SERVICE_NAME),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("ap_monitor.cluster_radius_km", config.cluster_radius_km),
            KeyValue::new(
                "ap_monitor.access_points_per_page",
                i64::from(config.access_points_per_page),
            ),
        ])
        .build()
}

fn tracer_provider(endpoint: &str, resource: Resource) -> Result<SdkTracerProvider> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::BatchSpanProcessor;

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AppError::Config(format!("Invalid OTLP endpoint '{endpoint}': {e}")))?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .build())
}

/// Flushes and shuts down the span exporter when dropped.
pub struct OtelGuard {
    provider: SdkTracerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        // The subscriber may already be gone, so report on stderr.
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to flush spans on shutdown: {e:?}");
        }
    }
}
