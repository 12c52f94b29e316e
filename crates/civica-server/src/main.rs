#![forbid(unsafe_code)]

use civica_server::{build_router, config, AppState, ServerConfig};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_list(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("CIVICA_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let cfg = ServerConfig {
        bind_addr: env::var("CIVICA_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        database_path: PathBuf::from(
            env::var("CIVICA_DB_PATH").unwrap_or_else(|_| "civica.db".to_string()),
        ),
        session_secret: env::var("CIVICA_SESSION_SECRET")
            .unwrap_or_else(|_| "civica-dev-secret".to_string()),
        session_ttl: Duration::from_secs(env_u64("CIVICA_SESSION_TTL_SECS", 60 * 60 * 24 * 2)),
        cors_allowed_origins: env_list("CIVICA_CORS_ALLOWED_ORIGINS"),
        seed_fixtures: env_bool("CIVICA_SEED_FIXTURES", false),
        reset_on_boot: env_bool("CIVICA_RESET_ON_BOOT", false),
    };
    config::validate_startup_config_contract(&cfg)?;

    let conn = civica_store::open_file(&cfg.database_path).map_err(|e| e.to_string())?;
    if cfg.reset_on_boot {
        civica_store::schema::reset_schema(&conn).map_err(|e| e.to_string())?;
    } else {
        civica_store::schema::init_schema(&conn).map_err(|e| e.to_string())?;
    }
    if cfg.seed_fixtures {
        civica_store::schema::seed_demo_data(&conn).map_err(|e| e.to_string())?;
    }
    info!(db = %cfg.database_path.display(), "store ready");

    let bind_addr = cfg.bind_addr.clone();
    let state = AppState::new(conn, cfg);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind failed on {bind_addr}: {e}"))?;
    info!("civica-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
