use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::PortConfig;
use crate::error::{Result, TransportError};
use crate::traits::{PortDriver, PortHandle, PortInfo, PortKind};

/// In-memory driver for tests and demos.
///
/// Ports are registered up front with [`install`]; each registration returns
/// a [`MockPortScript`] used to feed inbound bytes, inspect written bytes,
/// and inject faults. Opening an unregistered port fails the way a missing
/// device would.
///
/// [`install`]: MockDriver::install
#[derive(Clone, Default)]
pub struct MockDriver {
    ports: Arc<Mutex<HashMap<String, Arc<Mutex<ScriptState>>>>>,
}

/// Test-side handle to a registered mock port.
///
/// Clones share the same underlying port state.
#[derive(Clone)]
pub struct MockPortScript {
    state: Arc<Mutex<ScriptState>>,
}

#[derive(Default)]
struct ScriptState {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    open: bool,
    opens: usize,
    fail_open: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    fail_close: bool,
}

// A panicked test holding the lock must not wedge every other script call.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a port under `name` and return its script handle.
    pub fn install(&self, name: &str) -> MockPortScript {
        let state = Arc::new(Mutex::new(ScriptState::default()));
        lock(&self.ports).insert(name.to_string(), Arc::clone(&state));
        MockPortScript { state }
    }
}

impl PortDriver for MockDriver {
    fn open(&self, config: &PortConfig) -> Result<Box<dyn PortHandle>> {
        let state = lock(&self.ports)
            .get(&config.port)
            .cloned()
            .ok_or_else(|| TransportError::Open {
                port: config.port.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such port"),
            })?;

        let mut script = lock(&state);
        if let Some(reason) = &script.fail_open {
            return Err(TransportError::Open {
                port: config.port.clone(),
                source: io::Error::other(reason.clone()),
            });
        }
        script.open = true;
        script.opens += 1;
        drop(script);

        Ok(Box::new(MockPort { state }))
    }

    fn list_ports(&self) -> Result<Vec<PortInfo>> {
        let mut names: Vec<String> = lock(&self.ports).keys().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| PortInfo {
                name,
                kind: PortKind::Unknown,
                manufacturer: None,
                product: None,
            })
            .collect())
    }
}

struct MockPort {
    state: Arc<Mutex<ScriptState>>,
}

impl PortHandle for MockPort {
    fn bytes_to_read(&mut self) -> Result<usize> {
        let script = lock(&self.state);
        if script.fail_reads {
            return Err(TransportError::Io(io::Error::other("scripted read failure")));
        }
        Ok(script.incoming.len())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut script = lock(&self.state);
        if script.fail_reads {
            return Err(TransportError::Io(io::Error::other("scripted read failure")));
        }
        script.incoming.pop_front().ok_or_else(|| {
            TransportError::Io(io::Error::new(io::ErrorKind::WouldBlock, "no bytes queued"))
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut script = lock(&self.state);
        if script.fail_writes {
            return Err(TransportError::Io(io::Error::other(
                "scripted write failure",
            )));
        }
        script.written.extend_from_slice(bytes);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let mut script = lock(&self.state);
        script.open = false;
        if script.fail_close {
            return Err(TransportError::Io(io::Error::other(
                "scripted close failure",
            )));
        }
        Ok(())
    }
}

impl MockPortScript {
    /// Queue bytes for subsequent reads.
    pub fn feed(&self, bytes: &[u8]) {
        lock(&self.state).incoming.extend(bytes.iter().copied());
    }

    /// Bytes written to the port so far; clears the capture.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.state).written)
    }

    /// Number of queued bytes not yet read.
    pub fn pending(&self) -> usize {
        lock(&self.state).incoming.len()
    }

    /// Whether the port is currently open.
    pub fn is_open(&self) -> bool {
        lock(&self.state).open
    }

    /// How many times the port has been opened.
    pub fn opens(&self) -> usize {
        lock(&self.state).opens
    }

    /// Make subsequent opens fail with `reason`.
    pub fn fail_open(&self, reason: &str) {
        lock(&self.state).fail_open = Some(reason.to_string());
    }

    /// Let opens succeed again.
    pub fn allow_open(&self) {
        lock(&self.state).fail_open = None;
    }

    /// Make reads fail until [`allow_reads`](MockPortScript::allow_reads).
    pub fn fail_reads(&self) {
        lock(&self.state).fail_reads = true;
    }

    /// Let reads succeed again.
    pub fn allow_reads(&self) {
        lock(&self.state).fail_reads = false;
    }

    /// Make writes fail until [`allow_writes`](MockPortScript::allow_writes).
    pub fn fail_writes(&self) {
        lock(&self.state).fail_writes = true;
    }

    /// Let writes succeed again.
    pub fn allow_writes(&self) {
        lock(&self.state).fail_writes = false;
    }

    /// Make the next close report a failure.
    pub fn fail_close(&self) {
        lock(&self.state).fail_close = true;
    }
}
