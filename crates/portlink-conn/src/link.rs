use std::sync::Arc;

use tracing::{info, warn};

use portlink_transport::{PortDriver, PortInfo};

use crate::config::ConnConfig;
use crate::conn::Conn;
use crate::error::{LinkError, Result};
use crate::sink::EventSink;

/// A request against the link, ready to be routed by
/// [`SerialLink::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    /// Register a new connection and attempt its first connect.
    AddConn(ConnConfig),
    /// Replace the configuration of the connection named `name`.
    EditConn { name: String, config: ConnConfig },
    /// Drop the connection, stopping its poller and closing its port.
    RemoveConn { name: String },
    /// Open the connection's transport.
    Connect { name: String },
    /// Close the connection's transport.
    Disconnect { name: String },
    /// Frame and write one message, with optional sentinel overrides.
    Send {
        name: String,
        message: String,
        start_code: Option<String>,
        end_code: Option<String>,
    },
    /// Enumerate the serial ports currently visible on the system.
    RescanPorts,
}

/// What a successfully dispatched command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed with nothing to return.
    Done,
    /// The ports visible after a rescan.
    Ports(Vec<PortInfo>),
}

/// The set of managed connections, keyed by their unique names.
///
/// All mutation goes through this type so the uniqueness rule holds: no
/// two connections may share a name, and a rename is rejected when it
/// would collide with another connection.
pub struct SerialLink {
    driver: Arc<dyn PortDriver>,
    sink: Arc<dyn EventSink>,
    conns: Vec<Conn>,
}

impl SerialLink {
    pub fn new(driver: Arc<dyn PortDriver>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            driver,
            sink,
            conns: Vec::new(),
        }
    }

    /// Route one command to the connection it names.
    pub fn dispatch(&mut self, command: LinkCommand) -> Result<CommandOutcome> {
        match command {
            LinkCommand::AddConn(config) => {
                self.add_conn(config)?;
                Ok(CommandOutcome::Done)
            }
            LinkCommand::EditConn { name, config } => {
                self.edit_conn(&name, config)?;
                Ok(CommandOutcome::Done)
            }
            LinkCommand::RemoveConn { name } => {
                self.remove_conn(&name)?;
                Ok(CommandOutcome::Done)
            }
            LinkCommand::Connect { name } => {
                self.get(&name)?.connect()?;
                Ok(CommandOutcome::Done)
            }
            LinkCommand::Disconnect { name } => {
                self.get(&name)?.disconnect();
                Ok(CommandOutcome::Done)
            }
            LinkCommand::Send {
                name,
                message,
                start_code,
                end_code,
            } => {
                self.get(&name)?
                    .send(&message, start_code.as_deref(), end_code.as_deref())?;
                Ok(CommandOutcome::Done)
            }
            LinkCommand::RescanPorts => Ok(CommandOutcome::Ports(self.rescan_ports()?)),
        }
    }

    /// Register `config` and attempt its first connect.
    ///
    /// The connection is kept even when that first attempt fails; it sits
    /// in `FailedToConnect` until a retry succeeds. Only a name collision
    /// or an unresolvable configuration rejects the add.
    pub fn add_conn(&mut self, config: ConnConfig) -> Result<()> {
        if self.find(&config.name).is_some() {
            return Err(LinkError::DuplicateConn(config.name));
        }
        let conn = Conn::new(config, Arc::clone(&self.driver), Arc::clone(&self.sink))?;
        if let Err(err) = conn.connect() {
            warn!(conn = %conn.name(), error = %err, "initial connect failed");
        }
        self.conns.push(conn);
        Ok(())
    }

    /// Reconfigure the connection named `name`, possibly renaming it.
    pub fn edit_conn(&mut self, name: &str, config: ConnConfig) -> Result<()> {
        if config.name != name && self.find(&config.name).is_some() {
            return Err(LinkError::DuplicateConn(config.name));
        }
        self.get(name)?.reconfigure(config)
    }

    /// Remove the connection named `name`, reaping its poller and closing
    /// its port.
    pub fn remove_conn(&mut self, name: &str) -> Result<()> {
        let index = self
            .find(name)
            .ok_or_else(|| LinkError::UnknownConn(name.to_string()))?;
        let mut conn = self.conns.remove(index);
        conn.unsubscribe();
        conn.disconnect();
        info!(conn = %name, "removed connection");
        Ok(())
    }

    /// Start polling the named connection's value.
    pub fn subscribe(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.subscribe();
        Ok(())
    }

    /// Stop polling the named connection's value.
    pub fn unsubscribe(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.unsubscribe();
        Ok(())
    }

    /// Re-register a saved set of configurations, typically at startup.
    ///
    /// Entries that fail to resolve or collide are logged and skipped so
    /// one bad saved entry cannot block the rest.
    pub fn restore(&mut self, configs: Vec<ConnConfig>) {
        for config in configs {
            let name = config.name.clone();
            if let Err(err) = self.add_conn(config) {
                warn!(conn = %name, error = %err, "skipping saved connection");
            }
        }
    }

    /// Enumerate the serial ports currently visible on the system.
    pub fn rescan_ports(&self) -> Result<Vec<PortInfo>> {
        self.driver.list_ports().map_err(Into::into)
    }

    /// The connection named `name`, if registered.
    pub fn conn(&self, name: &str) -> Option<&Conn> {
        self.find(name).map(|i| &self.conns[i])
    }

    /// All registered connections, in registration order.
    pub fn conns(&self) -> impl Iterator<Item = &Conn> {
        self.conns.iter()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.conns.iter().position(|c| c.name() == name)
    }

    fn get(&self, name: &str) -> Result<&Conn> {
        self.find(name)
            .map(|i| &self.conns[i])
            .ok_or_else(|| LinkError::UnknownConn(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Conn> {
        self.find(name)
            .map(|i| &mut self.conns[i])
            .ok_or_else(|| LinkError::UnknownConn(name.to_string()))
    }
}
