//! Async session with a treadmill controller over a serial port.
//!
//! ```no_run
//! # async fn run() -> Result<(), treadmill_session::SessionError> {
//! use treadmill_session::{EventKind, PortSession};
//!
//! let mut session = PortSession::new();
//! let mut temperatures = session.events().subscribe_to(EventKind::TemperatureReceived);
//!
//! session.open("/dev/ttyUSB0", 115200).await?;
//! session.set_speed(40).await?;
//! if let Some(event) = temperatures.recv().await {
//!     println!("{:?}", event);
//! }
//! session.close().await
//! # }
//! ```

pub use config::{SessionConfig, DEFAULT_EVENT_CAPACITY, DEFAULT_POLL_INTERVAL};
pub use connector::{Connector, SerialConnector};
pub use error::SessionError;
pub use events::{EventKind, EventRouter, ListenerHandle, SessionEvent, Subscription};
pub use session::{PortSession, SessionState};

mod commands;
mod config;
mod connector;
mod error;
mod events;
mod session;
#[cfg(test)]
mod testing;
