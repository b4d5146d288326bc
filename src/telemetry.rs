use anyhow::Result;
use once_cell::sync::Lazy;

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, MeterProvider as _},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{metrics::SdkMeterProvider, resource::Resource, trace::SdkTracerProvider};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4318";
const INSTRUMENTATION_SCOPE: &str = "quote_engine_core";

static COMMIT_SHA: Lazy<String> =
    Lazy::new(|| std::env::var("CE_COMMIT_SHA").unwrap_or_else(|_| "unknown".into()));

/// Endpoints OTLP/HTTP resolvidos do ambiente.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtlpEndpoints {
    pub traces: String,
    pub metrics: String,
}

impl OtlpEndpoints {
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            std::env::var("OTEL_EXPORTER_OTLP_TRACES_ENDPOINT").ok(),
            std::env::var("OTEL_EXPORTER_OTLP_METRICS_ENDPOINT").ok(),
        )
    }

    /// Endpoints específicos vencem; senão `{base}/v1/traces` e `{base}/v1/metrics`.
    pub fn resolve(base: Option<String>, traces: Option<String>, metrics: Option<String>) -> Self {
        let base = base.unwrap_or_else(|| DEFAULT_OTLP_ENDPOINT.to_string());
        let base = base.trim_end_matches('/');
        Self {
            traces: traces.unwrap_or_else(|| format!("{base}/v1/traces")),
            metrics: metrics.unwrap_or_else(|| format!("{base}/v1/metrics")),
        }
    }
}

/// Resultado de uma cotação, como atributo das métricas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteOutcome {
    Quoted,
    Rejected(&'static str),
}

pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
    pub quote_latency_ms: Histogram<f64>,
    pub quote_rejections: Counter<u64>,
}

impl Telemetry {
    /// Registra latência e, se for o caso, a rejeição com o código do catálogo.
    pub fn record_quote(&self, latency_ms: f64, outcome: QuoteOutcome) {
        match outcome {
            QuoteOutcome::Quoted => {
                self.quote_latency_ms.record(latency_ms, &[KeyValue::new("outcome", "quoted")]);
            }
            QuoteOutcome::Rejected(code) => {
                self.quote_latency_ms.record(latency_ms, &[KeyValue::new("outcome", "rejected")]);
                self.quote_rejections.add(1, &[KeyValue::new("code", code)]);
            }
        }
    }

    pub fn shutdown(self) -> Result<()> {
        self.meter_provider.force_flush()?;
        self.tracer_provider.shutdown()?;
        self.meter_provider.shutdown()?;
        Ok(())
    }
}

/// Subscriber global (`EnvFilter` + fmt + OTel) e exportadores OTLP/HTTP.
/// Deve ser chamado fora de um runtime tokio (cliente HTTP bloqueante).
pub fn init(service_name: &str) -> Result<Telemetry> {
    let endpoints = OtlpEndpoints::from_env();

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("git.commit.sha", COMMIT_SHA.clone()),
        ])
        .build();

    // Traces
    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoints.traces.clone())
        .build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    // Métricas
    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoints.metrics.clone())
        .build()?;
    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_periodic_exporter(metric_exporter)
        .build();

    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    let tracer = tracer_provider.tracer(service_name.to_string());
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(fmt_layer).with(otel_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    let meter = meter_provider.meter(INSTRUMENTATION_SCOPE);
    let quote_latency_ms = meter
        .f64_histogram("quote_latency_ms")
        .with_unit("ms")
        .with_description("Latency of swap quotes in ms")
        .build();
    let quote_rejections = meter
        .u64_counter("quote_rejections")
        .with_description("Quotes rejected by validation or liquidity guard")
        .build();

    tracing::info!(traces = %endpoints.traces, metrics = %endpoints.metrics, "telemetry initialized");
    Ok(Telemetry { tracer_provider, meter_provider, quote_latency_ms, quote_rejections })
}

/// Span INFO com nome **estático**; o nome dinâmico vai em `span_name`.
pub fn make_info_span(name: &str, op_id: u32, component: &str) -> tracing::Span {
    tracing::span!(
        target: "quote_engine_core",
        Level::INFO,
        "op",
        git_commit_sha = %COMMIT_SHA.as_str(),
        span_name = %name,
        op_id = op_id,
        component = component
    )
}
