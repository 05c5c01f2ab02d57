pub mod progression;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::InvalidRequest(e.to_string())
    }
}
