use thiserror::Error;

/// Result type returned from functions that can have our `Error`s.
pub type Result<T, E = LumenError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LumenError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("controller '{0}' is not a valid path component")]
    InvalidController(String),

    #[error("invalid mincap value of '{mincap}': mincap must not exceed the maximum of '{max}'")]
    MincapExceedsMax { mincap: u64, max: u64 },

    #[error("maximum brightness is zero")]
    ZeroMaxBrightness,

    #[error("no saved brightness value for controller '{0}'")]
    NoSavedValue(String),

    #[error("no controllers found under '{0}'")]
    NoControllers(String),

    #[error("invalid combination of arguments: {0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Other(String),
}
