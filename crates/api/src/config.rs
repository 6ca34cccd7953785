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
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public origin embedded in scan and registration URLs
    /// (default: `http://localhost:5173`).
    pub public_origin: String,
    /// Reverse-geocoding endpoint base URL. Unset disables geocoding and
    /// scans degrade to raw coordinates.
    pub geocode_base_url: Option<String>,
    /// Email delivery API settings. An unset URL routes invitations to
    /// the log-only mailer (dev).
    pub email: EmailConfig,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
}

/// Email delivery API settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// HTTP endpoint of the delivery API.
    pub api_url: Option<String>,
    /// Bearer token for the delivery API.
    pub api_key: Option<String>,
    /// From address on invitation emails.
    pub from_address: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_ORIGIN`        | `http://localhost:5173`    |
    /// | `GEOCODE_BASE_URL`     | (unset)                    |
    /// | `EMAIL_API_URL`        | (unset)                    |
    /// | `EMAIL_API_KEY`        | (unset)                    |
    /// | `EMAIL_FROM`           | `connect@knect.app`        |
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

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_origin =
            std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());

        let geocode_base_url = std::env::var("GEOCODE_BASE_URL").ok();

        let email = EmailConfig {
            api_url: std::env::var("EMAIL_API_URL").ok(),
            api_key: std::env::var("EMAIL_API_KEY").ok(),
            from_address: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "connect@knect.app".into()),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_origin,
            geocode_base_url,
            email,
            jwt,
        }
    }
}
