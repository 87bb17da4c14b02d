use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("root directory is missing or unreadable: {0}")]
    RootDir(PathBuf),

    #[error("too many directories: the worker pool holds at most {capacity}")]
    TooManyWorkers { capacity: usize },

    #[error("invalid index at {path}: {detail}")]
    Index { path: PathBuf, detail: String },

    #[error("cannot start worker for {worker}: {source}")]
    Spawn {
        worker: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lost result stream from worker {worker}: {source}")]
    Protocol {
        worker: String,
        #[source]
        source: std::io::Error,
    },
}
