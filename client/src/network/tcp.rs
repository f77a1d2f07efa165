use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    sync::mpsc,
    thread,
    time::Duration,
};

use super::framing::{split_packets, PacketLengths};
use super::{Connector, NetworkCommand, NetworkEvent, Transport};

/// Length of the bare account-id preamble very old servers send right after `CZ_ENTER`.
const RAW_PREAMBLE_LEN: usize = 4;

/// Opens [`TcpTransport`]s, each driven by its own network thread.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    lengths: PacketLengths,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(lengths: PacketLengths, connect_timeout: Duration) -> Self {
        Self {
            lengths,
            connect_timeout,
        }
    }
}

impl Connector for TcpConnector {
    fn open(&mut self, host: &str, port: u16) -> Box<dyn Transport> {
        let (command_tx, command_rx) = mpsc::channel::<NetworkCommand>();
        let (event_tx, event_rx) = mpsc::channel::<NetworkEvent>();

        let addr = format!("{host}:{port}");
        let lengths = self.lengths.clone();
        let timeout = self.connect_timeout;

        let spawned = thread::Builder::new()
            .name(format!("zone-net {addr}"))
            .spawn(move || {
                log::debug!("Network task started for {addr}");
                run_network_task(&addr, timeout, lengths, command_rx, event_tx);
            });

        let mut transport = TcpTransport {
            command_tx,
            event_rx,
            open: true,
            pending_failure: None,
        };
        if let Err(e) = spawned {
            log::error!("Failed to spawn network thread: {e}");
            transport.pending_failure = Some(format!("Connect failed: {e}"));
        }
        Box::new(transport)
    }
}

/// Engine side of a TCP connection.
pub struct TcpTransport {
    command_tx: mpsc::Sender<NetworkCommand>,
    event_rx: mpsc::Receiver<NetworkEvent>,
    open: bool,
    pending_failure: Option<String>,
}

impl TcpTransport {
    fn command(&mut self, cmd: NetworkCommand) {
        if !self.open {
            return;
        }
        if self.command_tx.send(cmd).is_err() {
            log::warn!("Network task is gone; marking transport closed");
            self.open = false;
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: Vec<u8>) {
        self.command(NetworkCommand::Send(bytes));
    }

    fn read_raw(&mut self) {
        self.command(NetworkCommand::ReadRaw);
    }

    fn poll(&mut self) -> Option<NetworkEvent> {
        if let Some(message) = self.pending_failure.take() {
            self.open = false;
            return Some(NetworkEvent::ConnectFailed(message));
        }

        match self.event_rx.try_recv() {
            Ok(evt) => {
                if matches!(
                    evt,
                    NetworkEvent::ConnectFailed(_) | NetworkEvent::Error(_) | NetworkEvent::Closed
                ) {
                    self.open = false;
                }
                Some(evt)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.open = false;
                None
            }
        }
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        let _ = self.command_tx.send(NetworkCommand::Shutdown);
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Connects, then runs the read/write loop until shutdown or failure.
fn run_network_task(
    addr: &str,
    timeout: Duration,
    lengths: PacketLengths,
    command_rx: mpsc::Receiver<NetworkCommand>,
    event_tx: mpsc::Sender<NetworkEvent>,
) {
    let stream = match connect_stream(addr, timeout) {
        Ok(s) => s,
        Err(e) => {
            log::error!("connect_stream failed: {e}");
            let _ = event_tx.send(NetworkEvent::ConnectFailed(e));
            return;
        }
    };

    log::info!("Connected to {addr}");
    let _ = event_tx.send(NetworkEvent::Connected);

    let event_tx_loop = event_tx.clone();
    match run_network_loop(stream, &lengths, command_rx, event_tx_loop) {
        Ok(()) => {
            let _ = event_tx.send(NetworkEvent::Closed);
        }
        Err(e) => {
            log::error!("network loop exited with error: {e}");
            let _ = event_tx.send(NetworkEvent::Error(e));
        }
    }
}

/// Resolves `addr` and connects to the first address that answers within `timeout`.
///
/// Returns a user-displayable error string on failure.
fn connect_stream(addr: &str, timeout: Duration) -> Result<TcpStream, String> {
    let candidates: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| format!("Cannot resolve {addr}: {e}"))?
        .collect();

    let mut last_error = format!("No address found for {addr}");
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                log::warn!("Connect to {candidate} failed: {e}");
                last_error = format!("Connect failed: {e}");
            }
        }
    }
    Err(last_error)
}

/// Interleaves queued writes with non-blocking reads, framing inbound bytes into packets.
fn run_network_loop(
    mut stream: TcpStream,
    lengths: &PacketLengths,
    command_rx: mpsc::Receiver<NetworkCommand>,
    event_tx: mpsc::Sender<NetworkEvent>,
) -> Result<(), String> {
    stream.set_nonblocking(true).map_err(|e| {
        log::error!("Failed to set stream to nonblocking mode: {e}");
        "Failed to set stream to nonblocking mode".to_string()
    })?;
    if let Err(e) = stream.set_nodelay(true) {
        log::warn!("Failed to set TCP_NODELAY: {e}");
    }

    let mut recv_buf: Vec<u8> = Vec::with_capacity(16 * 1024);
    let mut read_buffer = [0u8; 4096];
    let mut raw_requested = false;

    loop {
        let mut did_work = false;

        loop {
            match command_rx.try_recv() {
                Ok(cmd) => {
                    did_work = true;
                    match cmd {
                        NetworkCommand::Send(bytes) => {
                            write_all_blocking(&mut stream, &bytes)?;
                            log::debug!("Sent {} bytes to server", bytes.len());
                        }
                        NetworkCommand::ReadRaw => raw_requested = true,
                        NetworkCommand::Shutdown => {
                            log::info!("Network task shutting down");
                            let _ = stream.shutdown(std::net::Shutdown::Both);
                            return Ok(());
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }

        match stream.read(&mut read_buffer) {
            Ok(0) => {
                log::warn!("Server closed connection");
                return Ok(());
            }
            Ok(n) => {
                did_work = true;
                let chunk = &read_buffer[..n];
                if raw_requested {
                    raw_requested = false;
                    let _ = event_tx.send(NetworkEvent::Raw(chunk.to_vec()));
                    // The preamble is not a framed packet; anything else still is.
                    if n != RAW_PREAMBLE_LEN {
                        recv_buf.extend_from_slice(chunk);
                    }
                } else {
                    recv_buf.extend_from_slice(chunk);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                log::error!("Read failed in network loop: {e}");
                return Err(format!("Read failed: {e}"));
            }
        }

        if !recv_buf.is_empty() {
            let packets = split_packets(&mut recv_buf, lengths)?;
            for packet in packets {
                did_work = true;
                if event_tx.send(NetworkEvent::Packet(packet)).is_err() {
                    log::warn!("Network task: event receiver dropped, shutting down");
                    return Ok(());
                }
            }
        }

        if !did_work {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// `write_all` on a non-blocking socket, retrying while the send buffer is full.
fn write_all_blocking(stream: &mut TcpStream, mut bytes: &[u8]) -> Result<(), String> {
    while !bytes.is_empty() {
        match stream.write(bytes) {
            Ok(0) => return Err("Send failed: connection closed".to_string()),
            Ok(n) => bytes = &bytes[n..],
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted
                ) =>
            {
                thread::sleep(Duration::from_millis(1));
            }
            Err(e) => return Err(format!("Send failed: {e}")),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    fn poll_until(transport: &mut dyn Transport, want: impl Fn(&NetworkEvent) -> bool) -> NetworkEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(evt) = transport.poll() {
                if want(&evt) {
                    return evt;
                }
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("timed out waiting for network event");
    }

    #[test]
    fn frames_packets_and_forwards_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut hello = [0u8; 3];
            socket.read_exact(&mut hello).unwrap();
            // ZC_NOTIFY_TIME split over two writes, then ZC_ACCEPT_QUIT.
            socket.write_all(&[0x7F, 0x00, 1]).unwrap();
            socket.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            socket.write_all(&[0, 0, 0, 0x91, 0x01]).unwrap();
            hello
        });

        let mut connector =
            TcpConnector::new(PacketLengths::default(), Duration::from_millis(1000));
        let mut transport = connector.open("127.0.0.1", port);
        assert_eq!(
            poll_until(transport.as_mut(), |_| true),
            NetworkEvent::Connected
        );

        transport.send(vec![1, 2, 3]);
        assert_eq!(
            poll_until(transport.as_mut(), |_| true),
            NetworkEvent::Packet(vec![0x7F, 0x00, 1, 0, 0, 0])
        );
        assert_eq!(
            poll_until(transport.as_mut(), |_| true),
            NetworkEvent::Packet(vec![0x91, 0x01])
        );
        assert_eq!(server.join().unwrap(), [1, 2, 3]);

        transport.close();
        transport.close();
        assert!(!transport.is_open());
    }

    #[test]
    fn refused_connection_reports_connect_failed() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let mut connector =
            TcpConnector::new(PacketLengths::default(), Duration::from_millis(500));
        let mut transport = connector.open("127.0.0.1", port);
        let evt = poll_until(transport.as_mut(), |_| true);
        assert!(matches!(evt, NetworkEvent::ConnectFailed(_)), "{evt:?}");
        assert!(!transport.is_open());
    }
}
