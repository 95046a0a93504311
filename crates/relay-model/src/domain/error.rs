use thiserror::Error;

/// Failure to classify a worker line.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("structured message is not valid json: {0}")]
    Json(#[source] serde_json::Error),
    #[error("structured message is not a json array")]
    NotAnArray,
    #[error("structured message is missing its {0}")]
    MissingField(&'static str),
    #[error("structured message type must be a string, got {0}")]
    InvalidType(String),
    #[error("done payload is not a list of file names: {0}")]
    FileNames(#[source] serde_json::Error),
}

/// Failure to build the payload handed to the worker.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("task details are not valid json: {0}")]
    Details(#[source] serde_json::Error),
    #[error("task details must be a json object")]
    DetailsNotObject,
    #[error("dependency #{index} is not valid json: {source}")]
    Dependency {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("dependency #{index} must be a json array")]
    DependencyNotArray { index: usize },
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
}
