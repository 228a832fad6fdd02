//! Configuration management for the API server
//!
//! Loaded from environment variables (a `.env` file is honoured in
//! development).
//!
//! # Environment Variables
//!
//! - `API_HOST` / `API_PORT`: bind address (default `0.0.0.0:8080`)
//! - `CORS_ORIGINS`: comma separated origins, `*` for permissive (default `*`)
//! - `PRODUCTION`: enables HSTS (default `false`)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default 10)
//! - `RUN_MIGRATIONS`: apply embedded migrations on startup (default `true`)
//! - `JWT_SECRET`: token signing key, at least 32 characters (required)
//! - `UPLOAD_DIR`: where uploaded photos are written (default `./uploads`)
//! - `PUBLIC_UPLOAD_BASE_URL`: URL prefix uploaded files are served under
//! - `CLIENT_PAGE_BASE_URL` / `CONSULTANT_PAGE_BASE_URL`: public landing page bases
//!
//! # Example
//!
//! ```no_run
//! use vitrine_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};
use vitrine_shared::landing::config::PageUrlBases;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing key. Generate with `openssl rand -hex 32`.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub public_base_url: String,
    /// Largest accepted photo, in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    pub client_base_url: String,
    pub consultant_base_url: String,
}

impl PagesConfig {
    pub fn url_bases(&self) -> PageUrlBases {
        PageUrlBases {
            client: self.client_base_url.clone(),
            consultant: self.consultant_base_url.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

/// Splits a comma separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` is missing, the secret is
    /// shorter than 32 characters, or a numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env_or("API_HOST", "0.0.0.0");
        let port = env_or("API_PORT", "8080").parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let upload_dir = PathBuf::from(env_or("UPLOAD_DIR", "./uploads"));
        let public_base_url = env_or("PUBLIC_UPLOAD_BASE_URL", "http://localhost:8080/uploads");

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins: parse_list(&env_or("CORS_ORIGINS", "*")),
                production: env_flag("PRODUCTION", false),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations: env_flag("RUN_MIGRATIONS", true),
            },
            jwt: JwtConfig { secret: jwt_secret },
            uploads: UploadConfig {
                dir: upload_dir,
                public_base_url,
                max_bytes: 5 * 1024 * 1024,
            },
            pages: PagesConfig {
                client_base_url: env_or("CLIENT_PAGE_BASE_URL", "http://localhost:3000/p"),
                consultant_base_url: env_or(
                    "CONSULTANT_PAGE_BASE_URL",
                    "http://localhost:3000/seja-consultor",
                ),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Public URL of an uploaded file
    pub fn upload_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.uploads.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
                run_migrations: false,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            uploads: UploadConfig {
                dir: PathBuf::from("/tmp/uploads"),
                public_base_url: "https://cdn.vitrine.app/uploads/".to_string(),
                max_bytes: 1024,
            },
            pages: PagesConfig {
                client_base_url: "https://vitrine.app/p".to_string(),
                consultant_base_url: "https://vitrine.app/seja".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_upload_url() {
        assert_eq!(
            config().upload_url("abc.png"),
            "https://cdn.vitrine.app/uploads/abc.png"
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" https://a.com, ,https://b.com "),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_url_bases() {
        let bases = config().pages.url_bases();
        assert_eq!(bases.client, "https://vitrine.app/p");
    }
}
