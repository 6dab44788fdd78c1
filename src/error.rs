use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankboardError {
    #[error("invalid board configuration: {0}")]
    Config(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("move rejected: row {source_row} cannot drop into row {target_row}")]
    RowLocked { source_row: usize, target_row: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RankboardError>;
