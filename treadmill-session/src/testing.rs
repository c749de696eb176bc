use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

use tokio::io::{duplex, AsyncRead, AsyncReadExt, AsyncWrite, DuplexStream, ReadBuf};
use tokio::sync::mpsc;

use crate::{Connector, SessionError};

/// Host end of an in-memory pipe that can be told to fail writes or shutdown.
pub(crate) struct FakePort {
    inner: DuplexStream,
    failing_writes: usize,
    failing_shutdown: bool,
}

impl AsyncRead for FakePort {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for FakePort {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.failing_writes > 0 {
            this.failing_writes -= 1;
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out")));
        }
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.failing_shutdown {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "port busy")));
        }
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

/// Hands the session one end of an in-memory pipe per `connect` and the
/// test the other end, standing in for the device. Armed faults apply to the
/// next port handed out.
pub(crate) struct DuplexConnector {
    devices: mpsc::UnboundedSender<DuplexStream>,
    failing_connect: AtomicBool,
    failing_writes: AtomicUsize,
    failing_shutdown: AtomicBool,
}

impl DuplexConnector {
    pub(crate) fn fail_next_connect(&self) {
        self.failing_connect.store(true, Ordering::SeqCst);
    }

    /// The first `count` writes on the next port fail.
    pub(crate) fn fail_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub(crate) fn fail_shutdown(&self) {
        self.failing_shutdown.store(true, Ordering::SeqCst);
    }
}

impl Connector for DuplexConnector {
    type Io = FakePort;

    fn connect(&self, path: &str, _baud_rate: u32) -> Result<Self::Io, SessionError> {
        if self.failing_connect.swap(false, Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path)).into());
        }
        let (host, device) = duplex(1024);
        // the test may have stopped listening
        let _ = self.devices.send(device);
        Ok(FakePort {
            inner: host,
            failing_writes: self.failing_writes.swap(0, Ordering::SeqCst),
            failing_shutdown: self.failing_shutdown.swap(false, Ordering::SeqCst),
        })
    }
}

pub(crate) fn device_pair() -> (DuplexConnector, mpsc::UnboundedReceiver<DuplexStream>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let connector = DuplexConnector {
        devices: tx,
        failing_connect: AtomicBool::new(false),
        failing_writes: AtomicUsize::new(0),
        failing_shutdown: AtomicBool::new(false),
    };
    (connector, rx)
}

pub(crate) async fn read_exactly(device: &mut DuplexStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0; len];
    device.read_exact(&mut buf).await.unwrap();
    buf
}
