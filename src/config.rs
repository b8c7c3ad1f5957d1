//! Configuration module

use std::env;
use std::path::PathBuf;

use validator::Validate;

use crate::logic::model::default_manifest_path;

const DEV_JWT_SECRET: &str = "veritas-dev-secret-change-in-production";

/// Application configuration
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Server port
    #[validate(range(min = 1))]
    pub port: u16,

    /// JWT secret key (HS256)
    #[validate(length(min = 16))]
    pub jwt_secret: String,

    /// ONNX classifier file
    pub model_path: PathBuf,

    /// Training-time manifest sidecar
    pub manifest_path: PathBuf,

    /// Upper bound for an uploaded file
    #[validate(range(min = 1))]
    pub max_upload_bytes: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let model_path: PathBuf = lookup("MODEL_PATH")
            .unwrap_or_else(|| "ml_models/authenticity_model.onnx".to_string())
            .into();

        let manifest_path = lookup("MODEL_MANIFEST_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_manifest_path(&model_path));

        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            jwt_secret: lookup("JWT_SECRET")
                .unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            model_path,
            manifest_path,

            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|b| b.parse().ok())
                .unwrap_or(25 * 1024 * 1024),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Validate field ranges and production requirements
    pub fn check(&self) -> anyhow::Result<()> {
        self.validate()?;

        if self.is_production() && self.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("JWT_SECRET must be set in production");
        }

        Ok(())
    }
}
