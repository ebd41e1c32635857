#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no node with id `{id}` in the simulation")]
    UnknownNode { id: String },

    #[error("connectivity source has no entity `{id}`")]
    UnknownEntity { id: String },

    #[error("invalid force configuration: {message}")]
    Config { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
