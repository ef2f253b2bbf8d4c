use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `180`; generation is slow).
    pub request_timeout_secs: u64,
    /// Seconds to wait for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// How long finished background jobs stay queryable (default: `3600`).
    pub job_retention_secs: u64,
    /// Interval of the background sweeper (default: `60`).
    pub sweep_interval_secs: u64,
}

/// Fixed-window limits for `/api/*`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests per window per client on every `/api` route.
    pub requests_per_window: u32,
    /// Requests per window per client on the generation routes.
    pub generate_per_window: u32,
    pub window_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `180`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                       |
    /// | `RATE_LIMIT_REQUESTS`      | `100`                      |
    /// | `RATE_LIMIT_GENERATE`      | `10`                       |
    /// | `RATE_LIMIT_WINDOW_SECS`   | `60`                       |
    /// | `JOB_RETENTION_SECS`       | `3600`                     |
    /// | `SWEEP_INTERVAL_SECS`      | `60`                       |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rate_limit = RateLimitConfig {
            requests_per_window: env_parse("RATE_LIMIT_REQUESTS", 100),
            generate_per_window: env_parse("RATE_LIMIT_GENERATE", 10),
            window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", 60),
        };
        assert!(
            rate_limit.window_secs > 0,
            "RATE_LIMIT_WINDOW_SECS must be greater than zero"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 180),
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            rate_limit,
            job_retention_secs: env_parse("JOB_RETENTION_SECS", 3600),
            sweep_interval_secs: env_parse::<u64>("SWEEP_INTERVAL_SECS", 60).max(1),
        }
    }
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + ToString,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid number"))
}
