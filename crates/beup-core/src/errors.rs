/// Core error type for the packaging pipeline.
///
/// Adapter crates map their specific failures into this type so the pipeline
/// can decide uniformly what is fatal for the run and what is not.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("split tool exited with status {status}: {stderr}")]
    SplitTool { status: i32, stderr: String },

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
