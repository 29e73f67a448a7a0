use thiserror::Error;

pub type FunnelResult<T> = Result<T, FunnelError>;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Malformed dataset row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
