//! Runtime configuration for the API.

use triage_core::auth::token::TokenSecrets;

/// Configuration assembled from environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Deployment environment; `"production"` turns on the `Secure` cookie
    /// attribute.
    pub environment: String,
    /// Allowed CORS origin, `"*"` for any.
    pub origin: String,
    /// Whether CORS responses may include credentials.
    pub credentials: bool,
    /// Signing secrets for access and refresh tokens.
    pub secrets: TokenSecrets,
}

impl ApiConfig {
    /// Read configuration from the environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `BIND_ADDR` | `127.0.0.1:3000` |
    /// | `DATABASE_URL` | `postgres://localhost:5432/triage` |
    /// | `ENVIRONMENT` (or `NODE_ENV`) | `development` |
    /// | `ORIGIN` | `*` |
    /// | `CREDENTIALS` | `false` |
    ///
    /// Token secrets resolve separately, see [`TokenSecrets::resolve`].
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3000"),
            database_url: env_or("DATABASE_URL", "postgres://localhost:5432/triage"),
            environment: first_env_or(&["ENVIRONMENT", "NODE_ENV"], "development"),
            origin: env_or("ORIGIN", "*"),
            credentials: env_or("CREDENTIALS", "false") == "true",
            secrets: TokenSecrets::resolve(),
        }
    }

    /// True when running in production.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_or(name: &str, default: &str) -> String {
    first_env_or(&[name], default)
}

fn first_env_or(names: &[&str], default: &str) -> String {
    for name in names {
        if let Ok(value) = std::env::var(name)
            && !value.is_empty()
        {
            return value;
        }
    }
    default.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_flag_follows_environment() {
        let mut config = ApiConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            database_url: String::new(),
            environment: "development".to_string(),
            origin: "*".to_string(),
            credentials: false,
            secrets: TokenSecrets {
                access: "a".to_string(),
                refresh: "r".to_string(),
            },
        };
        assert!(!config.is_production());
        config.environment = "production".to_string();
        assert!(config.is_production());
    }
}
