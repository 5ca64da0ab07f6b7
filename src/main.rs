use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum_server::Handle;
use time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{AppState, Config, build_router, create_pool, graceful_shutdown, initialize};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let pool = create_pool(&config.database_path, config.pool_size)
        .expect("Could not create the database connection pool.");
    initialize(&pool.get().expect("Could not get a database connection."))
        .expect("Could not initialize the database.");

    let state = AppState::new(
        pool,
        &config.jwt_secret,
        Duration::hours(config.jwt_expiry_hours),
    );

    let allowed_origin: HeaderValue = config
        .cors_origin
        .parse()
        .expect("FINTRACK_CORS_ORIGIN is not a valid header value.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("HTTP server listening on {}", addr);

    axum_server::bind(addr)
        .handle(handle)
        .serve(build_router(state, allowed_origin).into_make_service())
        .await
        .expect("Could not start the server.");
}
