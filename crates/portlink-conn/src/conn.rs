use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use portlink_frame::{encode_frame, FrameAssembler, SentinelCode};
use portlink_transport::{PortDriver, PortHandle};

use crate::config::{ConnConfig, ResolvedConfig};
use crate::error::{LinkError, Result};
use crate::poller::PollTask;
use crate::sink::{EventSink, LinkEvent};
use crate::status::ConnStatus;

/// Fixed delay between the end of one poll run and the start of the next.
pub const POLL_DELAY: Duration = Duration::from_millis(500);

/// One named serial connection: a transport handle, a frame assembler, a
/// status, and the most recent decoded value, all guarded by one mutex.
///
/// The poll task and user commands both mutate that state. The single lock
/// is what guarantees a disconnect never closes the port under a read, and
/// that a poll run racing an unsubscribe observes the cleared subscription
/// flag instead of touching the stream.
pub struct Conn {
    driver: Arc<dyn PortDriver>,
    sink: Arc<dyn EventSink>,
    state: Arc<Mutex<ConnState>>,
    poller: Option<PollTask>,
}

struct ConnState {
    config: ConnConfig,
    resolved: ResolvedConfig,
    port: Option<Box<dyn PortHandle>>,
    assembler: FrameAssembler,
    status: ConnStatus,
    subscribed: bool,
    last_value: Option<String>,
}

// The state is consistent at every lock boundary, so a poisoned mutex is
// recoverable.
fn lock(state: &Mutex<ConnState>) -> MutexGuard<'_, ConnState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Conn {
    /// Create the connection in `Initializing` and publish that status.
    ///
    /// Fails when the configuration does not resolve; nothing is published
    /// in that case. The first connect attempt is the caller's to make.
    pub fn new(
        config: ConnConfig,
        driver: Arc<dyn PortDriver>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let resolved = config.resolve()?;
        let name = config.name.clone();
        let assembler = FrameAssembler::new(resolved.start, resolved.end);
        let state = Arc::new(Mutex::new(ConnState {
            config,
            resolved,
            port: None,
            assembler,
            status: ConnStatus::Initializing,
            subscribed: false,
            last_value: None,
        }));

        let conn = Self {
            driver,
            sink,
            state,
            poller: None,
        };
        debug!(conn = %name, "created connection");
        conn.sink.publish(LinkEvent::Status {
            conn: name,
            status: ConnStatus::Initializing,
        });
        Ok(conn)
    }

    /// Connection name.
    pub fn name(&self) -> String {
        lock(&self.state).config.name.clone()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ConnStatus {
        lock(&self.state).status
    }

    /// Most recently published value, if any frame has completed.
    pub fn last_value(&self) -> Option<String> {
        lock(&self.state).last_value.clone()
    }

    /// The raw configuration, as persisted.
    pub fn config(&self) -> ConnConfig {
        lock(&self.state).config.clone()
    }

    /// Whether the value is currently being polled.
    pub fn is_subscribed(&self) -> bool {
        self.poller.is_some()
    }

    /// Open the transport. A no-op when already connected.
    ///
    /// On failure the status becomes `FailedToConnect` and the error is
    /// returned; connect stays available for retry.
    pub fn connect(&self) -> Result<()> {
        let mut st = lock(&self.state);
        if st.port.is_some() {
            return Ok(());
        }
        let name = st.config.name.clone();

        match self.driver.open(&st.resolved.port) {
            Ok(port) => {
                st.port = Some(port);
                st.status = ConnStatus::Connected;
                drop(st);
                info!(conn = %name, "connected");
                self.sink.publish(LinkEvent::Status {
                    conn: name,
                    status: ConnStatus::Connected,
                });
                Ok(())
            }
            Err(err) => {
                st.status = ConnStatus::FailedToConnect;
                drop(st);
                warn!(conn = %name, error = %err, "connect failed");
                self.sink.publish(LinkEvent::Status {
                    conn: name,
                    status: ConnStatus::FailedToConnect,
                });
                Err(err.into())
            }
        }
    }

    /// Close the transport if it is open.
    ///
    /// The in-flight frame is always discarded, even when no port is open.
    /// Close failures are logged, never surfaced, and the status still
    /// becomes `Disconnected`.
    pub fn disconnect(&self) {
        let mut st = lock(&self.state);
        st.assembler.reset();
        let Some(port) = st.port.take() else {
            return;
        };
        let name = st.config.name.clone();
        if let Err(err) = port.close() {
            warn!(conn = %name, error = %err, "error closing port");
        }
        st.status = ConnStatus::Disconnected;
        drop(st);
        info!(conn = %name, "disconnected");
        self.sink.publish(LinkEvent::Status {
            conn: name,
            status: ConnStatus::Disconnected,
        });
    }

    /// Re-initialize with `config`: tear down the open port, swap in the
    /// new settings with a fresh assembler, then reconnect.
    ///
    /// A config that fails to resolve aborts before any teardown, leaving
    /// the previous configuration and connection state intact.
    pub fn reconfigure(&self, config: ConnConfig) -> Result<()> {
        let resolved = config.resolve()?;
        self.disconnect();

        let mut st = lock(&self.state);
        let name = config.name.clone();
        st.assembler = FrameAssembler::new(resolved.start, resolved.end);
        st.config = config;
        st.resolved = resolved;
        st.status = ConnStatus::Initializing;
        drop(st);
        info!(conn = %name, "reconfigured");
        self.sink.publish(LinkEvent::Status {
            conn: name,
            status: ConnStatus::Initializing,
        });

        self.connect()
    }

    /// Frame and write one message.
    ///
    /// Overrides, when present, are parsed with the sentinel rules against
    /// the connection's charset; the message itself is encoded under the
    /// connection's charset mode. Nothing reaches the wire unless every
    /// step succeeds, and a write failure aborts this send only.
    pub fn send(
        &self,
        message: &str,
        start_override: Option<&str>,
        end_override: Option<&str>,
    ) -> Result<()> {
        let mut st = lock(&self.state);
        if st.port.is_none() {
            return Err(LinkError::NotConnected);
        }

        let charset = st.resolved.charset;
        let start = match start_override {
            Some(code) => SentinelCode::parse(code, charset)?,
            None => st.resolved.start,
        };
        let end = match end_override {
            Some(code) => SentinelCode::parse(code, charset)?,
            None => st.resolved.end,
        };
        let payload = charset.encode(message)?;
        let frame = encode_frame(&payload, start, end);

        let name = st.config.name.clone();
        let Some(port) = st.port.as_mut() else {
            return Err(LinkError::NotConnected);
        };
        if let Err(err) = port.write_all(&frame) {
            warn!(conn = %name, error = %err, "send failed");
            return Err(err.into());
        }
        debug!(conn = %name, bytes = frame.len(), %start, %end, "sent frame");
        Ok(())
    }

    /// Start polling the value. A no-op when already subscribed.
    ///
    /// The poll task runs immediately, then every [`POLL_DELAY`] measured
    /// from the end of one run to the start of the next.
    pub fn subscribe(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let mut st = lock(&self.state);
        st.subscribed = true;
        let name = st.config.name.clone();
        drop(st);
        debug!(conn = %name, "subscribed");

        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        self.poller = Some(PollTask::spawn(POLL_DELAY, move || {
            let mut st = lock(&state);
            if !st.subscribed {
                return;
            }
            let mut events = Vec::new();
            drain(&mut st, &mut events);
            drop(st);
            for event in events {
                sink.publish(event);
            }
        }));
    }

    /// Stop polling and discard any partially collected frame, so a later
    /// resubscribe never observes stale bytes.
    ///
    /// A poll run already in progress is allowed to finish; the worker is
    /// reaped before this returns.
    pub fn unsubscribe(&mut self) {
        let mut st = lock(&self.state);
        st.subscribed = false;
        st.assembler.reset();
        let name = st.config.name.clone();
        drop(st);

        if let Some(poller) = self.poller.take() {
            poller.cancel();
            drop(poller);
        }
        debug!(conn = %name, "unsubscribed");
    }

    /// Run one poll execution immediately, regardless of subscription.
    ///
    /// Embedders driving their own scheduler can call this instead of
    /// [`subscribe`](Conn::subscribe). With no open port it is a silent
    /// no-op.
    pub fn poll_once(&self) {
        let mut st = lock(&self.state);
        let mut events = Vec::new();
        drain(&mut st, &mut events);
        drop(st);
        for event in events {
            self.sink.publish(event);
        }
    }
}

/// Drain every currently available byte through the assembler, collecting a
/// value event per completed frame. A read error aborts this run only.
fn drain(st: &mut ConnState, events: &mut Vec<LinkEvent>) {
    let name = st.config.name.clone();
    let ConnState {
        port,
        assembler,
        resolved,
        last_value,
        ..
    } = &mut *st;
    let Some(port) = port.as_mut() else {
        return;
    };

    loop {
        match port.bytes_to_read() {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(conn = %name, error = %err, "poll aborted");
                break;
            }
        }
        let byte = match port.read_byte() {
            Ok(byte) => byte,
            Err(err) => {
                warn!(conn = %name, error = %err, "poll aborted");
                break;
            }
        };
        if let Some(frame) = assembler.consume(byte) {
            let text = resolved.charset.decode(&frame);
            debug!(conn = %name, bytes = frame.len(), "completed frame");
            *last_value = Some(text.clone());
            events.push(LinkEvent::Value {
                conn: name.clone(),
                text,
            });
        }
    }
}
