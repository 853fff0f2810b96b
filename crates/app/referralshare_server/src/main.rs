//! ReferralShare server binary.
//!
//! Reads configuration from flags or the environment (a `.env` file is
//! honoured), runs migrations, builds the link registry and serves HTTP
//! until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use referralshare_api::config::ApiConfig;
use referralshare_api::{AppState, router};
use referralshare_core::identity::{GoogleConfig, GoogleIdentityProvider};
use referralshare_core::registry::LinkRegistry;
use referralshare_core::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use referralshare_core::store::{PgUserStore, UserStore};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How often the in-memory session fallback evicts expired entries.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "referralshare_server", about = "ReferralShare HTTP server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/referralshare"
    )]
    database_url: String,

    /// Redis URL for the session store. Sessions are kept in process memory
    /// when unset, and are lost on restart.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10)]
    max_connections: u32,

    /// Upper bound on every store call, in milliseconds.
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 5000)]
    store_timeout_ms: u64,

    /// Session lifetime in seconds (at least 1).
    #[arg(
        long,
        env = "SESSION_TTL_SECS",
        default_value_t = 2_592_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    session_ttl_secs: u64,

    /// Mark cookies `Secure`. Enable when served over HTTPS.
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    secure_cookies: bool,

    /// Google OAuth client id.
    #[arg(long, env = "GOOGLE_CLIENT_ID_REFERRALSHARE")]
    google_client_id: String,

    /// Google OAuth client secret.
    #[arg(long, env = "GOOGLE_CLIENT_SECRET_REFERRALSHARE", hide_env_values = true)]
    google_client_secret: String,

    /// Callback URL registered with Google.
    #[arg(
        long,
        env = "OAUTH_REDIRECT_URL",
        default_value = "http://localhost:8000/auth/callback"
    )]
    oauth_redirect_url: String,

    /// Rebuild the link registry every N seconds (0 = only at startup).
    #[arg(long, env = "REGISTRY_REFRESH_SECS", default_value_t = 0)]
    registry_refresh_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,referralshare_api=debug,referralshare_core=debug",
                )
            }),
        )
        .init();

    let args = Args::parse();
    let store_timeout = Duration::from_millis(args.store_timeout_ms);
    let session_ttl = Duration::from_secs(args.session_ttl_secs);

    info!(bind_addr = %args.bind_addr, "starting referralshare_server");
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(store_timeout)
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    referralshare_core::migrate::migrate(&pool).await?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool, store_timeout));

    let sessions: Arc<dyn SessionStore> = match &args.redis_url {
        Some(url) => {
            info!("using redis session store");
            Arc::new(
                RedisSessionStore::connect(url, args.max_connections, session_ttl, store_timeout)
                    .await?,
            )
        }
        None => {
            warn!("REDIS_URL not set; sessions are kept in memory and lost on restart");
            let store = Arc::new(MemorySessionStore::new(session_ttl));
            store.spawn_cleanup_task(SESSION_CLEANUP_INTERVAL);
            store
        }
    };

    let provider = Arc::new(GoogleIdentityProvider::new(
        GoogleConfig::new(
            args.google_client_id,
            args.google_client_secret,
            args.oauth_redirect_url,
        ),
        store_timeout,
    )?);

    // Startup fails if the registry cannot be built.
    let registry = Arc::new(LinkRegistry::load(users.as_ref()).await?);
    info!(participants = registry.snapshot().total(), "link registry built");

    let shutdown = CancellationToken::new();
    let refresh = (args.registry_refresh_secs > 0).then(|| {
        info!(every_secs = args.registry_refresh_secs, "periodic registry rebuild enabled");
        registry.spawn_refresh_task(
            Arc::clone(&users),
            Duration::from_secs(args.registry_refresh_secs),
            shutdown.clone(),
        )
    });

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        secure_cookies: args.secure_cookies,
    };
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let state = AppState::new(config, users, sessions, provider, registry);
    let app = router(state);

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    info!(addr = %local_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = refresh {
        let _ = handle.await;
    }
    info!("server stopped");

    Ok(())
}
