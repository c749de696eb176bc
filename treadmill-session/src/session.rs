use std::mem;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use treadmill_codec::FrameCodec;
use treadmill_protocol::{Command, Frame, Response};

use crate::{
    Connector, EventRouter, SerialConnector, SessionConfig, SessionError, SessionEvent,
};

type SharedWriter<W> = Arc<Mutex<FramedWrite<WriteHalf<W>, FrameCodec>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

struct OpenPort<Io> {
    path: String,
    writer: SharedWriter<Io>,
    token: CancellationToken,
    reader: JoinHandle<()>,
    poller: Option<JoinHandle<()>>,
}

enum State<Io> {
    Closed,
    Open(OpenPort<Io>),
}

/// Exclusive owner of one device connection.
///
/// While open, a reader task turns inbound bytes into events and a poller
/// task requests temperature and pressure every `poll_interval`. All writes,
/// from callers and the poller alike, go through one lock and never interleave.
pub struct PortSession<C: Connector = SerialConnector> {
    connector: C,
    config: SessionConfig,
    router: EventRouter,
    state: State<C::Io>,
}

impl PortSession<SerialConnector> {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_connector(SerialConnector, config)
    }
}

impl Default for PortSession<SerialConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> PortSession<C> {
    pub fn with_connector(connector: C, config: SessionConfig) -> Self {
        let config = config.sanitized();
        let router = EventRouter::new(config.event_capacity);
        Self {
            connector,
            config,
            router,
            state: State::Closed,
        }
    }

    pub fn events(&self) -> &EventRouter {
        &self.router
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Closed => SessionState::Closed,
            State::Open(_) => SessionState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Opens `path`, closing the current port first if there is one.
    pub async fn open(&mut self, path: &str, baud_rate: u32) -> Result<(), SessionError> {
        let result = self.open_port(path, baud_rate).await;
        self.report(result)
    }

    /// Stops polling and reading, then releases the transport. Once this
    /// returns no further events are published for the old port.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        let result = self.close_port().await;
        self.report(result)
    }

    pub async fn send(&self, frame: Frame) -> Result<(), SessionError> {
        let result = self.send_frame(frame).await;
        self.report(result)
    }

    /// Writes raw bytes under the same lock as framed writes.
    pub async fn write(&self, bytes: &[u8]) -> Result<(), SessionError> {
        let result = self.write_bytes(bytes).await;
        self.report(result)
    }

    /// Surfaces a failure to subscribers as well as to the caller.
    pub(crate) fn report<T>(&self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(err) = &result {
            warn!("{}", err);
            self.router.publish(SessionEvent::SerialError(err.to_string()));
        }
        result
    }

    pub(crate) async fn send_frame(&self, frame: Frame) -> Result<(), SessionError> {
        let State::Open(port) = &self.state else {
            return Err(SessionError::NotOpen);
        };
        write_frame(&port.writer, frame).await
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<(), SessionError> {
        let State::Open(port) = &self.state else {
            return Err(SessionError::NotOpen);
        };

        let mut writer = port.writer.lock().await;
        discard_unsent(&mut *writer);
        trace!("Writing {} raw bytes", bytes.len());
        let io = writer.get_mut();
        io.write_all(bytes).await?;
        io.flush().await?;
        Ok(())
    }

    async fn open_port(&mut self, path: &str, baud_rate: u32) -> Result<(), SessionError> {
        if self.is_open() {
            debug!("Port already open, closing it before opening {}", path);
            self.close_port().await?;
        }

        let io = self.connector.connect(path, baud_rate)?;
        let (read_half, write_half) = tokio::io::split(io);
        let writer = Arc::new(Mutex::new(FramedWrite::new(write_half, FrameCodec::new())));
        let token = CancellationToken::new();

        let reader = tokio::spawn(read_responses(
            FramedRead::new(read_half, FrameCodec::new()),
            self.router.clone(),
            token.clone(),
        ));
        let poller = self.config.polling.then(|| {
            tokio::spawn(poll_readings(
                writer.clone(),
                self.router.clone(),
                token.clone(),
                self.config.poll_interval,
            ))
        });

        info!("Opened {} (baudrate={})", path, baud_rate);
        self.state = State::Open(OpenPort {
            path: path.to_string(),
            writer,
            token,
            reader,
            poller,
        });
        Ok(())
    }

    async fn close_port(&mut self) -> Result<(), SessionError> {
        let State::Open(port) = mem::replace(&mut self.state, State::Closed) else {
            debug!("Port already closed");
            return Ok(());
        };

        port.token.cancel();
        if let Err(err) = port.reader.await {
            warn!("Reader task ended abnormally: {}", err);
        }
        if let Some(poller) = port.poller {
            if let Err(err) = poller.await {
                warn!("Poller task ended abnormally: {}", err);
            }
        }

        let mut writer = port.writer.lock().await;
        discard_unsent(&mut *writer);
        let result = writer.close().await;
        info!("Closed {}", port.path);
        result.map_err(SessionError::from)
    }
}

impl<C: Connector> Drop for PortSession<C> {
    fn drop(&mut self) {
        if let State::Open(port) = &self.state {
            port.token.cancel();
        }
    }
}

async fn write_frame<W>(writer: &SharedWriter<W>, frame: Frame) -> Result<(), SessionError>
where
    W: AsyncWrite,
{
    let mut writer = writer.lock().await;
    debug!("Sending frame {}", frame);
    if let Err(err) = writer.send(frame).await {
        discard_unsent(&mut *writer);
        return Err(err.into());
    }
    Ok(())
}

/// Drops bytes a failed or abandoned send left in the codec buffer.
fn discard_unsent<W>(writer: &mut FramedWrite<WriteHalf<W>, FrameCodec>) {
    let buffer = writer.write_buffer_mut();
    if !buffer.is_empty() {
        debug!("Discarding {} unsent bytes", buffer.len());
        buffer.clear();
    }
}

async fn read_responses<R>(
    mut frames: FramedRead<R, FrameCodec>,
    router: EventRouter,
    token: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;

            _ = token.cancelled() => break,
            next = frames.next() => next,
        };

        match next {
            Some(Ok(frame)) => {
                debug!("Received frame {}", frame);
                match Response::from_frame(&frame) {
                    Ok(response) => router.publish(response.into()),
                    Err(err) => {
                        warn!("Dropping frame {}: {}", frame, err);
                        router.publish(SessionEvent::SerialError(err.to_string()));
                    }
                }
            }
            Some(Err(err)) => {
                warn!("Failed reading from port: {}", err);
                router.publish(SessionEvent::SerialError(err.to_string()));
                break;
            }
            None => {
                debug!("Port reached end of stream");
                break;
            }
        }
    }
}

async fn poll_readings<W>(
    writer: SharedWriter<W>,
    router: EventRouter,
    token: CancellationToken,
    period: Duration,
) where
    W: AsyncWrite,
{
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'poll: loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,
            _ = ticks.tick() => {}
        }

        trace!("Polling temperature and pressure");
        for command in [Command::RequestTemperature, Command::RequestPressure] {
            // a stalled device must not keep close waiting on this write
            let result = match command.encode() {
                Ok(frame) => tokio::select! {
                    biased;

                    _ = token.cancelled() => break 'poll,
                    result = write_frame(&writer, frame) => result,
                },
                Err(err) => Err(err.into()),
            };
            if let Err(err) = result {
                warn!("Failed to poll {}: {}", command.id(), err);
                router.publish(SessionEvent::SerialError(err.to_string()));
            }
        }
    }
}
