//! Prometheus metrics and tracing span helpers.
//!
//! Metrics are recorded through OpenTelemetry meters and exported with the
//! Prometheus exporter into a private registry, which `/metrics` renders in
//! the text exposition format.

#[cfg(feature = "metrics")]
pub use prom::{render, ClinicMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prom {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<ClinicMetrics> = Lazy::new(ClinicMetrics::init);

    pub struct ClinicMetrics {
        registry: Registry,
        // Held so the reader stays registered for the life of the process.
        _provider: Option<SdkMeterProvider>,
        pub http_requests_total: Counter<u64>,
        pub http_request_duration: Histogram<f64>,
        pub query_duration: Histogram<f64>,
        pub query_errors_total: Counter<u64>,
        pub cache_lookups_total: Counter<u64>,
    }

    impl ClinicMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let provider = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => Some(SdkMeterProvider::builder().with_reader(exporter).build()),
                Err(e) => {
                    log::warn!("prometheus exporter unavailable, metrics disabled: {e}");
                    None
                }
            };
            let meter = match &provider {
                Some(p) => p.meter("petclinic"),
                None => opentelemetry::global::meter("petclinic"),
            };

            let http_requests_total = meter
                .u64_counter("petclinic_http_requests_total")
                .with_description("HTTP requests served, by route and status")
                .build();
            let http_request_duration = meter
                .f64_histogram("petclinic_http_request_duration_seconds")
                .with_description("Time spent handling HTTP requests")
                .build();
            let query_duration = meter
                .f64_histogram("petclinic_query_duration_seconds")
                .with_description("Duration of database queries")
                .build();
            let query_errors_total = meter
                .u64_counter("petclinic_query_errors_total")
                .with_description("Database queries that returned an error")
                .build();
            let cache_lookups_total = meter
                .u64_counter("petclinic_cache_lookups_total")
                .with_description("Cache lookups, by cache name and outcome")
                .build();

            Self {
                registry,
                _provider: provider,
                http_requests_total,
                http_request_duration,
                query_duration,
                query_errors_total,
                cache_lookups_total,
            }
        }

        pub fn record_request(&self, route: &'static str, status: u16, elapsed: Duration) {
            let attrs = [
                KeyValue::new("route", route),
                KeyValue::new("status", i64::from(status)),
            ];
            self.http_requests_total.add(1, &attrs);
            self.http_request_duration
                .record(elapsed.as_secs_f64(), &attrs[..1]);
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_cache_lookup(&self, cache: &'static str, hit: bool) {
            let outcome = if hit { "hit" } else { "miss" };
            self.cache_lookups_total.add(
                1,
                &[KeyValue::new("cache", cache), KeyValue::new("outcome", outcome)],
            );
        }
    }

    /// Render every collected metric family in the Prometheus text format.
    pub fn render() -> Result<String, String> {
        let families = METRICS.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer).map_err(|e| format!("metrics are not valid UTF-8: {e}"))
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span, Subscriber};
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    /// Env var holding the span filter, e.g. `petclinic=info`.
    pub const TRACE_FILTER_ENV: &str = "PETCLINIC_TRACE";

    /// Registry that prints each span with its timings when it closes.
    pub fn span_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE),
        )
    }

    /// Install [`span_subscriber`] on stderr as the global default.
    ///
    /// [`TRACE_FILTER_ENV`] wins over `default_directive`.
    pub fn init_subscriber(default_directive: &str) -> Result<(), String> {
        let filter = EnvFilter::try_from_env(TRACE_FILTER_ENV)
            .or_else(|_| EnvFilter::try_new(default_directive))
            .map_err(|e| format!("invalid trace filter: {e}"))?;
        tracing::subscriber::set_global_default(span_subscriber(filter, std::io::stderr))
            .map_err(|e| format!("failed to install trace subscriber: {e}"))
    }

    /// Span wrapping a single statement sent to PostgreSQL.
    pub fn execute_query_span(sql: &str) -> Span {
        info_span!("petclinic.query", db.system = "postgresql", db.statement = sql)
    }

    /// Span wrapping one HTTP request.
    pub fn http_request_span(method: &str, path: &str) -> Span {
        info_span!("petclinic.request", http.method = method, http.target = path)
    }

    pub fn acquire_connection_span() -> Span {
        info_span!("petclinic.pool.acquire")
    }
}
