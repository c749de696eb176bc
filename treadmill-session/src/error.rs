use thiserror::Error;
use treadmill_protocol::RangeError;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Rejected before anything was written.
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("port is not open")]
    NotOpen,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The serial device could not be acquired.
    #[error(transparent)]
    Serial(#[from] tokio_serial::Error),
}
