//! The environment-driven configuration for the server.

use std::{env, net::IpAddr, path::PathBuf};

/// The configuration for the server, read from `FINTRACK_*` environment
/// variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// The address the server binds to.
    pub host: IpAddr,
    /// The port the server listens on.
    pub port: u16,
    /// The path to the SQLite database file.
    pub database_path: PathBuf,
    /// The maximum number of database connections in the pool.
    pub pool_size: u32,
    /// The origin the frontend is served from, for CORS.
    pub cors_origin: String,
    /// The server-held secret for signing bearer tokens.
    pub jwt_secret: String,
    /// How many hours issued bearer tokens stay valid.
    pub jwt_expiry_hours: i64,
}

impl Config {
    /// Read the configuration from the environment, loading a `.env` file if
    /// one is present.
    ///
    /// # Panics
    /// Panics if `FINTRACK_JWT_SECRET` is not set, or if a variable cannot be
    /// parsed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("FINTRACK_JWT_SECRET")
            .expect("The environment variable 'FINTRACK_JWT_SECRET' must be set.");

        Self {
            host: parse_or_default("FINTRACK_HOST", IpAddr::from([0, 0, 0, 0])),
            port: parse_or_default("FINTRACK_PORT", 7878),
            database_path: env::var("FINTRACK_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/fintrack.db")),
            pool_size: parse_or_default("FINTRACK_POOL_SIZE", 10),
            cors_origin: env::var("FINTRACK_CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_secret,
            jwt_expiry_hours: parse_or_default("FINTRACK_JWT_EXPIRY_HOURS", 24),
        }
    }
}

/// Parse the environment variable `env_key` if set, otherwise return
/// `default_value`.
///
/// # Panics
/// This function will panic if the environment variable is set but cannot be
/// parsed as a `T`.
fn parse_or_default<T: std::str::FromStr>(env_key: &str, default_value: T) -> T {
    let raw = match env::var(env_key) {
        Ok(raw) => raw,
        Err(_) => {
            tracing::debug!(
                "The environment variable '{}' was not set, using the default.",
                env_key
            );
            return default_value;
        }
    };

    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::error!(
                "An error occurred parsing '{}' from the environment variable '{}'.",
                raw,
                env_key
            );
            panic!("invalid value for environment variable '{env_key}'");
        }
    }
}
