use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read run description: {0}")]
    Read(#[source] std::io::Error),

    #[error("no run description on input")]
    EmptyInput,

    #[error("run description is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("failed to deserialize input: {0}")]
    Input(#[source] serde_json::Error),

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),
}
