//! Zone server connection: packet codecs, stream framing and the transport boundary.

pub mod client_commands;
pub mod framing;
pub mod server_commands;
pub mod tcp;

use client_commands::ClientCommand;

/// Requests from the engine to a transport's network task.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    Send(Vec<u8>),
    /// Deliver the next chunk of bytes unframed, as a [`NetworkEvent::Raw`].
    ReadRaw,
    Shutdown,
}

/// Notifications from a transport, delivered in order through [`Transport::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Connected,
    ConnectFailed(String),
    /// One complete framed packet, opcode included.
    Packet(Vec<u8>),
    /// Bytes answered to a [`NetworkCommand::ReadRaw`].
    Raw(Vec<u8>),
    Error(String),
    Closed,
}

/// An open (or opening) connection to one zone server.
pub trait Transport {
    fn send(&mut self, bytes: Vec<u8>);
    /// Asks for the next read to bypass framing.
    fn read_raw(&mut self);
    fn poll(&mut self) -> Option<NetworkEvent>;
    /// Idempotent.
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

/// Opens transports. Completion is reported asynchronously through the returned transport.
pub trait Connector {
    fn open(&mut self, host: &str, port: u16) -> Box<dyn Transport>;
}

/// The engine's handle on the current transport, if any.
///
/// Sending through a closed or missing transport is a silent no-op.
#[derive(Default)]
pub struct Link {
    transport: Option<Box<dyn Transport>>,
}

impl Link {
    /// Replaces the current transport, closing the previous one.
    pub fn replace(&mut self, transport: Box<dyn Transport>) {
        self.close();
        self.transport = Some(transport);
    }

    pub fn send(&mut self, command: &ClientCommand) {
        match self.transport.as_mut() {
            Some(transport) if transport.is_open() => {
                log::debug!(
                    "Sending {:?} ({} bytes)",
                    command.header(),
                    command.payload().len()
                );
                transport.send(command.to_bytes());
            }
            _ => log::debug!("Dropping {:?}: transport closed", command.header()),
        }
    }

    pub fn read_raw(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.read_raw();
        }
    }

    pub fn poll(&mut self) -> Option<NetworkEvent> {
        self.transport.as_mut()?.poll()
    }

    pub fn close(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }
}
