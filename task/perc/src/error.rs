use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("element {index} is out of range for a universe of {len} elements")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
