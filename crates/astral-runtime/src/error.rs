#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state `{key}` does not decode as the requested type: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
