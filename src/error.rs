// actimon — Error taxonomy

use thiserror::Error;

/// Acquisition or inference failure. The cycle is skipped and the previous
/// activity stays in place.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("frame has {actual} values, classifier expects {expected}")]
    FrameLength { expected: usize, actual: usize },

    #[error("sensor read failed: {0}")]
    Sensor(String),

    #[error("classifier backend returned {0}")]
    Backend(i32),
}

/// Send failure. The message is dropped; the next tick supersedes it.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link receiver closed")]
    Closed,

    #[error("link write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed confidence map. Indicates a broken classifier.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, Error>;
