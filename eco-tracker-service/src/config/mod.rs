use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct EcoConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorsConfig {
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl EcoConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env, configuration file, APP__ prefix and PORT
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(EcoConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: mongodb_uri(is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("eco_tracker_db"), is_prod)?,
            },
            store: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "mongo".to_string())
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            cors: CorsConfig {
                allowed_origins: parse_origins(
                    &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
                ),
            },
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            },
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

/// `MONGODB_URI` wins. Otherwise an Atlas SRV URI is assembled from
/// `DB_USER`/`DB_PASS`/`DB_HOST`, which is how existing deployments are
/// configured.
fn mongodb_uri(is_prod: bool) -> Result<String, AppError> {
    if let Ok(uri) = env::var("MONGODB_URI") {
        return Ok(uri);
    }

    match (env::var("DB_USER"), env::var("DB_PASS")) {
        (Ok(user), Ok(pass)) => {
            let host = get_env("DB_HOST", None, is_prod)?;
            let app_name = env::var("DB_APP_NAME").unwrap_or_else(|_| "eco-tracker".to_string());
            Ok(atlas_uri(&user, &pass, &host, &app_name))
        }
        _ => get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod),
    }
}

/// Credentials are percent-encoded so reserved characters survive.
fn atlas_uri(user: &str, pass: &str, host: &str, app_name: &str) -> String {
    format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority&appName={}",
        urlencoding::encode(user),
        urlencoding::encode(pass),
        host,
        urlencoding::encode(app_name)
    )
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
