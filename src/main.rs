use estate_portal::{
    AppState, DemoAccountDirectory, DirectoryState, FileKeyValueStore, KeyValueState,
    SessionStore, UserRoster,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the local shell: configuration, logging, the session core and
/// the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, otherwise development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "estate_portal=debug,tower_http=info,axum=trace".into());

    // 3. Log format by environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Session core: file-backed record, demo directory with simulated latency.
    let storage = Arc::new(FileKeyValueStore::new(&config.session_dir)) as KeyValueState;
    let directory = Arc::new(DemoAccountDirectory::from_config(&config)) as DirectoryState;

    let session = Arc::new(SessionStore::new(storage, directory));
    session.initialize();
    tracing::info!(
        session_dir = %config.session_dir.display(),
        restored = session.current().is_some(),
        "session store ready"
    );

    // 5. Unified state and router
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(session, Arc::new(UserRoster::seeded()), config);
    let app = create_router(app_state);

    // 6. Server
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind the shell address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
