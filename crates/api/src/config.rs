use keyfront_core::request::TransitionPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have sensible defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Platform admin credentials.
    pub admin: AdminConfig,
    /// Which status transitions the lifecycle engine accepts.
    pub transition_policy: TransitionPolicy,
}

/// Platform admin login credentials and the optional service API key.
///
/// The admin console is not backed by a profile row; its identity comes
/// from the environment, matching how the platform is operated.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    /// When set, requests carrying this value in `x-admin-api-key` are
    /// treated as platform-admin without a bearer token.
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default    |
    /// |-----------------------------|------------|
    /// | `HOST`                      | `0.0.0.0`  |
    /// | `PORT`                      | `8080`     |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`       |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`       |
    /// | `ADMIN_USERNAME`            | — required |
    /// | `ADMIN_EMAIL`               | —          |
    /// | `ADMIN_PASSWORD`            | — required |
    /// | `ADMIN_API_KEY`             | —          |
    /// | `STRICT_STATUS_TRANSITIONS` | `false`    |
    ///
    /// # Panics
    ///
    /// Panics when a required variable is missing or malformed -- the server
    /// must not boot half-configured.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let admin = AdminConfig {
            username: std::env::var("ADMIN_USERNAME")
                .expect("ADMIN_USERNAME must be set in the environment"),
            email: std::env::var("ADMIN_EMAIL").ok(),
            password: std::env::var("ADMIN_PASSWORD")
                .expect("ADMIN_PASSWORD must be set in the environment"),
            api_key: std::env::var("ADMIN_API_KEY").ok(),
        };

        let transition_policy = match std::env::var("STRICT_STATUS_TRANSITIONS").as_deref() {
            Ok("true") | Ok("1") => TransitionPolicy::Strict,
            _ => TransitionPolicy::Lenient,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            admin,
            transition_policy,
        }
    }
}
