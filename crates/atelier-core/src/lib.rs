pub mod app_config;
pub mod config;
pub mod identifiers;
pub mod products;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use identifiers::{fallback_slug, is_plausible_slug, new_handle, slugify, MIN_SLUG_LEN};
pub use products::{
    Color, CreateProduct, MediaRef, ProductStatus, ProductView, UpdateProduct,
    MEDIA_REFERENCE_PREFIX,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while parsing caller-supplied catalog values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid product status: {0}")]
    InvalidStatus(String),

    #[error("invalid color \"{0}\": expected NAME=#HEX")]
    InvalidColor(String),

    #[error("invalid media reference \"{0}\": expected a gid:// token")]
    InvalidMediaRef(String),
}
