//! HTTP ingress and process bootstrap for the order saga pipeline.
//!
//! Accepts create-order requests, publishes them as `OrderCreated` events,
//! and hosts the relay stages that carry each order through its lifecycle,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use message_bus::MessageBus;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{MetricsSink, OrderIngress, Pipeline, RecorderSink};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{Config, LogFormat};
use routes::orders::AppState;

/// Path of the create-order endpoint.
pub const ORDERS_PATH: &str = "/api/v1/orderApi/orders";

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<B: MessageBus + 'static>(
    state: Arc<AppState<B>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<B>))
        .route(ORDERS_PATH, post(routes::orders::create::<B>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the ingress state and the relay pipeline over `bus`, both
/// reporting counters to the process-wide recorder.
pub fn create_default_state<B: MessageBus + Clone + 'static>(
    bus: B,
) -> (Arc<AppState<B>>, Pipeline<B>) {
    let sink: Arc<dyn MetricsSink> = Arc::new(RecorderSink);

    let state = Arc::new(AppState {
        ingress: OrderIngress::new(bus.clone(), sink.clone()),
        bus: bus.clone(),
    });
    let pipeline = Pipeline::new(bus, sink);

    (state, pipeline)
}

/// Installs the global tracing subscriber.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Registers descriptions for every counter the pipeline emits.
pub fn describe_metrics() {
    metrics::describe_counter!(
        saga::ingress::CREATED_COUNTER,
        "Orders published to order.created"
    );
    metrics::describe_counter!(
        saga::monitor::FAILED_OBSERVED_COUNTER,
        "Failure events observed on order.failed"
    );
    for stage in saga::stages::ALL_STAGES {
        metrics::describe_counter!(stage.success_counter, "Envelopes relayed by the stage");
        metrics::describe_counter!(stage.failure_counter, "Failure events emitted by the stage");
    }
}
