use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid attribute '{key}' on element '{element}': {value:?}")]
    InvalidAttribute {
        element: String,
        key: String,
        value: String,
    },

    #[error("Horizontal range [{from}, {to}] overlaps previous range ending at {previous_to}")]
    GapOverlap { from: f64, to: f64, previous_to: f64 },

    #[error("Horizontal range [{from}, {to}] is empty (track not wider than viewport)")]
    DegenerateGap { from: f64, to: f64 },

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
