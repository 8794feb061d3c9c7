use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No element matches selector: {0}")]
    ElementNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid timeline position: {0}")]
    InvalidPosition(String),

    #[error("Unknown timeline label: {0}")]
    UnknownLabel(String),

    #[error("Invalid scroll position: {0}")]
    InvalidScrollPosition(String),

    #[error("Unknown ease: {0}")]
    UnknownEase(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
