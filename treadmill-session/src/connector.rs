use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

use crate::SessionError;

/// Acquires the byte stream a session runs over.
pub trait Connector {
    type Io: AsyncRead + AsyncWrite + Send + 'static;

    fn connect(&self, path: &str, baud_rate: u32) -> Result<Self::Io, SessionError>;
}

/// Opens a local serial device, 8N1 without flow control.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    type Io = tokio_serial::SerialStream;

    fn connect(&self, path: &str, baud_rate: u32) -> Result<Self::Io, SessionError> {
        debug!("Opening serial port {} (baudrate={})", path, baud_rate);

        let serial = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()?;
        Ok(serial)
    }
}
