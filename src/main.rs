//! Girder: a minimal web-service scaffold.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   GIRDER                      │
//!                      │                                               │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ──────────────────►│  │  http   │──►│ dispatch │──►│  guard    │  │
//!                      │  │ server  │   │  table   │   │  chain    │  │
//!                      │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                      │                                     │        │
//!                      │                                     ▼        │
//!   Client Response    │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ◄──────────────────│  │  error  │◄──│  route   │◄──│ terminal  │  │
//!                      │  │boundary │   │ handler  │   │  handler  │  │
//!                      │  └─────────┘   └──────────┘   └───────────┘  │
//!                      │                                               │
//!                      │  Cross-cutting: config, crypto, snowflake     │
//!                      │  ids, token codec, principal store            │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! Startup order: tracing → config → principal store seed → route
//! discovery → publish dispatch table → accept connections. Discovery
//! always finishes before the first request is admitted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use girder::config::{load_config, AppConfig};
use girder::dispatch::RouteRegistry;
use girder::http::{AppState, HttpServer};
use girder::id::SnowflakeGenerator;
use girder::principal::InMemoryPrincipalStore;
use girder::routes;
use girder::routes::test::TestState;
use girder::token::TokenCodec;

#[derive(Parser)]
#[command(name = "girder", about = "Minimal web-service scaffold")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "girder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("girder v0.1.0 starting");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        node_id = config.snowflake.node_id,
        guard_timeout_ms = config.dispatch.guard_timeout_ms,
        "Configuration loaded"
    );

    let ids = Arc::new(SnowflakeGenerator::new(config.snowflake.node_id));
    let store = Arc::new(InMemoryPrincipalStore::new());

    // Seed one demo principal so the session routes work out of the box.
    let demo = store.seed(&ids, Some("demo".to_string())).await?;
    tracing::info!(snowflake = %demo.snowflake, credential_key = "demo", "demo principal seeded");

    // Discovery completes before the table is published or the listener binds.
    let table = Arc::new(RouteRegistry::discover(&routes::sources()));

    let state = AppState {
        table,
        store,
        tokens: TokenCodec::new(),
        ids,
        test_state: Arc::new(TestState::default()),
        guard_timeout: Duration::from_millis(config.dispatch.guard_timeout_ms),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, state);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
