//! Crescendo - catalog search API.
//!
//! # Usage
//!
//! ```bash
//! # Start with default config
//! crescendo
//!
//! # Start with environment overrides
//! ENGINE_URL=http://localhost:9200 INDEX_PATTERN=catalog-works crescendo
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crescendo_core::metrics::init_metrics;
use crescendo_core::ports::{CountMode, SearchEngine};
use crescendo_core::services::{SearchConfig, SearchService};
use crescendo_elastic::{ElasticConfig, ElasticEngine};
use crescendo_graphql::{ServerConfig, build_schema, serve_with_shutdown};

/// Crescendo CLI - Allfeat catalog search API.
#[derive(Parser, Debug)]
#[command(name = "crescendo")]
#[command(about = "Crescendo - catalog search API by Allfeat")]
#[command(version)]
struct Cli {
    /// Search engine base URL.
    #[arg(long, env = "ENGINE_URL", default_value = "http://127.0.0.1:9200")]
    engine_url: String,

    /// Index name (or wildcard pattern) to search.
    #[arg(long, env = "INDEX_PATTERN", default_value = "catalog-works")]
    index_pattern: String,

    /// Engine request timeout in seconds.
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value = "10")]
    engine_timeout_secs: u64,

    /// GraphQL server port.
    #[arg(long, env = "GRAPHQL_PORT", default_value = "4000")]
    graphql_port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// Hard upper bound on the page size; larger requests are clamped.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "250")]
    max_page_size: usize,

    /// Total-count accuracy: exact (correct) or approximate (bounded cost).
    #[arg(long, env = "COUNT_MODE", default_value = "exact", value_parser = parse_count_mode)]
    count_mode: CountMode,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Parse count mode from string.
fn parse_count_mode(s: &str) -> Result<CountMode, String> {
    match s.to_lowercase().as_str() {
        "exact" => Ok(CountMode::Exact),
        "approximate" => Ok(CountMode::Approximate),
        _ => Err(format!(
            "Invalid count mode '{}'. Use 'exact' or 'approximate'.",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_enabled = match format!("0.0.0.0:{}", cli.metrics_port).parse::<std::net::SocketAddr>()
    {
        Ok(metrics_addr) => {
            match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    true
                }
                Err(e) => {
                    warn!(
                        "⚠️  Failed to start metrics exporter: {}. Continuing without metrics.",
                        e
                    );
                    false
                }
            }
        }
        Err(e) => {
            warn!("⚠️  Invalid metrics address: {}. Continuing without metrics.", e);
            false
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting Crescendo");
    debug!(engine_url = %mask_password(&cli.engine_url), "Engine endpoint");
    debug!(index_pattern = %cli.index_pattern, "Index pattern");

    // ─────────────────────────────────────────────────────────────────────────
    // 🔎 SEARCH ENGINE
    // ─────────────────────────────────────────────────────────────────────────
    let engine_config = ElasticConfig {
        endpoint: cli.engine_url.clone(),
        index_pattern: cli.index_pattern.clone(),
        request_timeout: Duration::from_secs(cli.engine_timeout_secs),
    };

    let engine = ElasticEngine::new(engine_config).context("Failed to build engine client")?;
    let engine = Arc::new(engine);

    // The service is a stateless read layer: an unreachable engine at boot
    // is reported but does not prevent startup.
    match engine.ping().await {
        Ok(()) => info!("🔗 Search engine reachable"),
        Err(e) => warn!("⚠️  Search engine unreachable: {}. Queries will fail until it is up.", e),
    }

    let search_config = SearchConfig {
        max_page_size: cli.max_page_size,
        count_mode: cli.count_mode,
        ..Default::default()
    };

    let service = Arc::new(SearchService::new(search_config, engine));

    // ─────────────────────────────────────────────────────────────────────────
    // ⚡ SERVICES START
    // ─────────────────────────────────────────────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = watch::channel(false);
    let mut graphql_shutdown_rx = shutdown_tx.subscribe();

    let graphql_config = ServerConfig {
        host: "0.0.0.0".to_string(),
        port: cli.graphql_port,
        enable_playground: true,
    };

    // Includes DoS protection: depth limit (15), complexity limit (500)
    let schema = build_schema(service);

    let graphql_port = cli.graphql_port;
    let graphql_handle = tokio::spawn(
        async move {
            let shutdown_signal = async move {
                while !*graphql_shutdown_rx.borrow() {
                    if graphql_shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            };

            if let Err(e) = serve_with_shutdown(schema, graphql_config, shutdown_signal).await {
                error!(error = %e, "❌ Server error");
            }
            debug!("Server stopped");
        }
        .instrument(info_span!("graphql")),
    );

    // ─────────────────────────────────────────────────────────────────────────
    // ✅ READY
    // ─────────────────────────────────────────────────────────────────────────
    info!("✅ Crescendo ready");
    info!("   ⚡ GraphQL:  http://localhost:{}/graphql", graphql_port);
    if metrics_enabled {
        info!(
            "   📊 Metrics:  http://localhost:{}/metrics",
            cli.metrics_port
        );
    } else {
        info!("   📊 Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    shutdown_signal().await;

    // ─────────────────────────────────────────────────────────────────────────
    // 🛑 SHUTDOWN
    // ─────────────────────────────────────────────────────────────────────────
    info!("🛑 Shutting down...");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(Duration::from_secs(10), graphql_handle).await {
        Ok(_) => debug!("GraphQL stopped"),
        Err(_) => warn!("⚠️  GraphQL shutdown timed out"),
    }

    info!("🛑 Shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

/// Mask password in engine URL for logging.
fn mask_password(url_str: &str) -> String {
    match url::Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
