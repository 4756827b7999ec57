use crate::config::error::ConfigError;
use crate::extract::error::ExtractError;
use crate::load::error::LoadError;
use crate::transform::error::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Extraction produced no files, nothing to transform")]
    NothingExtracted,
}
