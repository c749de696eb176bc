use std::fmt;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{trace, warn};
use treadmill_protocol::Response;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TemperatureReceived(f64),
    PressureReceived(f64),
    SpeedReceived(u16),
    InclineReceived(u16),
    SerialError(String),
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::TemperatureReceived(_) => EventKind::TemperatureReceived,
            SessionEvent::PressureReceived(_) => EventKind::PressureReceived,
            SessionEvent::SpeedReceived(_) => EventKind::SpeedReceived,
            SessionEvent::InclineReceived(_) => EventKind::InclineReceived,
            SessionEvent::SerialError(_) => EventKind::SerialError,
        }
    }
}

impl From<Response> for SessionEvent {
    fn from(response: Response) -> Self {
        match response {
            Response::Temperature(v) => SessionEvent::TemperatureReceived(v),
            Response::Pressure(v) => SessionEvent::PressureReceived(v),
            Response::Speed(v) => SessionEvent::SpeedReceived(v),
            Response::Incline(v) => SessionEvent::InclineReceived(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TemperatureReceived,
    PressureReceived,
    SpeedReceived,
    InclineReceived,
    SerialError,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::TemperatureReceived,
        EventKind::PressureReceived,
        EventKind::SpeedReceived,
        EventKind::InclineReceived,
        EventKind::SerialError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::TemperatureReceived => "temperatureReceived",
            EventKind::PressureReceived => "pressureReceived",
            EventKind::SpeedReceived => "speedReceived",
            EventKind::InclineReceived => "inclineReceived",
            EventKind::SerialError => "serialError",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fans session events out to every live subscriber.
///
/// Publishing never blocks. A subscriber that falls more than the channel
/// capacity behind loses the oldest events.
#[derive(Debug, Clone)]
pub struct EventRouter {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventRouter {
    /// A `capacity` of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: SessionEvent) {
        trace!("Publishing {:?}", event);
        // no subscribers is not an error
        let _ = self.tx.send(event);
    }

    /// Receives every event kind.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            filter: None,
        }
    }

    pub fn subscribe_to(&self, kind: EventKind) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            filter: Some(kind),
        }
    }

    /// Runs `callback` for each event of `kind` on a spawned task until the
    /// returned handle is removed or dropped. Must be called from within a
    /// Tokio runtime.
    pub fn listen<F>(&self, kind: EventKind, mut callback: F) -> ListenerHandle
    where
        F: FnMut(SessionEvent) + Send + 'static,
    {
        let mut subscription = self.subscribe_to(kind);
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        ListenerHandle { kind, task }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live feed of events. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<SessionEvent>,
    filter: Option<EventKind>,
}

impl Subscription {
    fn accepts(&self, event: &SessionEvent) -> bool {
        self.filter.map_or(true, |kind| event.kind() == kind)
    }

    /// Waits for the next matching event. Returns `None` once the router is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching event already queued, if any.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged behind, skipped {} events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Debug)]
pub struct ListenerHandle {
    kind: EventKind,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Detaches the callback. Same as dropping the handle.
    pub fn remove(self) {
        // the task is aborted in Drop
        drop(self);
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
