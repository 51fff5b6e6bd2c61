use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Similarity threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Sample interval must be greater than zero")]
    InvalidSampleInterval,

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
