use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("grid cell ({x}, {z}) outside world of {width}x{depth}")]
    OutOfRange { x: i32, z: i32, width: usize, depth: usize },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedMessage(err.to_string())
    }
}
