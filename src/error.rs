use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no <table> elements found in the case list")]
    NoTables,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document conversion failed: {0}")]
    Converter(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
