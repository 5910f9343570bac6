//! Order saga server entry point.

use api::config::Config;
use message_bus::InMemoryBus;
use tokio::signal;

/// Waits for SIGINT or SIGTERM, then closes the bus so the relay stages
/// finish their queued messages and stop.
async fn drain_on_signal(bus: InMemoryBus) {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };

    tracing::info!(signal = received, "draining order pipeline");
    bus.close().await;
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    api::init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    api::describe_metrics();

    // 3. Create the bus, ingress state and relay stages
    let bus = InMemoryBus::new();
    let (state, pipeline) = api::create_default_state(bus.clone());
    let workers = pipeline.spawn().await.expect("failed to start pipeline");

    // 4. Start server
    let app = api::create_app(state, metrics_handle);
    let addr = config.addr();
    tracing::info!(%addr, "starting order saga server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(drain_on_signal(bus.clone()))
        .await
        .expect("server error");

    // 5. Wait for the relay stages to finish their queues
    for worker in workers {
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "relay worker panicked");
        }
    }

    tracing::info!("server shut down gracefully");
}
