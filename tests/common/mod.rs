//! Shared utilities for integration testing.

use std::sync::Arc;
use std::time::Duration;

use girder::config::AppConfig;
use girder::dispatch::RouteRegistry;
use girder::http::{AppState, HttpServer};
use girder::id::SnowflakeGenerator;
use girder::principal::{InMemoryPrincipalStore, Principal};
use girder::routes;
use girder::routes::test::TestState;
use girder::token::TokenCodec;

/// A running scaffold instance bound to an ephemeral port.
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<InMemoryPrincipalStore>,
    pub demo: Principal,
    pub tokens: TokenCodec,
}

/// Start a full server (real listener, real dispatch table) and return
/// its address plus handles into its state.
pub async fn spawn_app() -> TestApp {
    let config = AppConfig::default();
    let ids = Arc::new(SnowflakeGenerator::new(0));
    let store = Arc::new(InMemoryPrincipalStore::new());
    let demo = store.seed(&ids, Some("demo".to_string())).await.unwrap();

    let table = Arc::new(RouteRegistry::discover(&routes::sources()));
    let tokens = TokenCodec::new();
    let state = AppState {
        table,
        store: store.clone(),
        tokens,
        ids,
        test_state: Arc::new(TestState::default()),
        guard_timeout: Duration::from_millis(config.dispatch.guard_timeout_ms),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, state);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    // Give the accept loop a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestApp {
        base_url: format!("http://{addr}"),
        store,
        demo,
        tokens,
    }
}
