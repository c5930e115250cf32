use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No pipelines found for project {project} on ref '{ref_}'")]
    NoPipelines { project: String, ref_: String },

    #[error("Invalid pipeline timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
