use crate::status::ConnStatus;

/// An observable side effect of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A completed inbound message, decoded under the connection's charset.
    Value { conn: String, text: String },
    /// A lifecycle transition.
    Status { conn: String, status: ConnStatus },
}

impl LinkEvent {
    /// Name of the connection the event belongs to.
    pub fn conn(&self) -> &str {
        match self {
            LinkEvent::Value { conn, .. } | LinkEvent::Status { conn, .. } => conn,
        }
    }
}

/// Receives connection events.
///
/// Events are delivered outside the connection lock, in the order the
/// underlying frames and transitions completed.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: LinkEvent);
}

/// Sink that drops every event; useful when only the send path matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: LinkEvent) {}
}

/// Channels make serviceable sinks in tests and single-consumer embeddings;
/// events published after the receiver hangs up are dropped.
impl EventSink for std::sync::mpsc::Sender<LinkEvent> {
    fn publish(&self, event: LinkEvent) {
        let _ = self.send(event);
    }
}
