use cascade::CascadeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Style error: {0}")]
    Style(#[from] CascadeError),

    #[error("Element already has a parent")]
    AlreadyAttached,

    #[error("Element is not a child of this element")]
    NotAChild,

    #[error("Attaching the element would make it its own ancestor")]
    WouldCycle,

    #[error("Unknown element type: {0}")]
    UnknownType(String),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

// Create a type alias for convenience
pub type Result<T> = std::result::Result<T, ElementError>;
