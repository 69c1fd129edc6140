use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("failed to generate output: {0}")]
    Generation(String),

    #[error("no rows extracted from document")]
    Empty,

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("conversion task failed: {0}")]
    Task(String),
}
