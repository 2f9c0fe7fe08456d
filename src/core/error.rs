use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid unit: expected 5, 6 or 15 cards, got {0}")]
    InvalidUnit(usize),

    #[error("Card slot {0} is empty")]
    MissingCard(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Chart has no scorable notes")]
    EmptyChart,

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
