use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// Malformed or under-width rows in an input table.
    DataFormat(String),
    /// Out-of-range hyperparameters or dimensions.
    InvalidConfig(String),
    /// Loss became non-finite during training (e.g. exploded learning rate).
    NumericInstability(String),
    /// Underlying file I/O failure.
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DataFormat(msg) => write!(f, "invalid data: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::NumericInstability(msg) => write!(f, "numeric instability: {msg}"),
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
