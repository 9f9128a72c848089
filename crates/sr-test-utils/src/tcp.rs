use crate::net::bind_loopback;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::task::JoinHandle;

/// A loopback listener that accepts and immediately drops connections.
pub struct AcceptingEndpoint {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl AcceptingEndpoint {
    /// `None` when the sandbox forbids binding.
    pub async fn start() -> Option<Self> {
        let listener = bind_loopback("accepting endpoint").await?;
        let addr = listener.local_addr().ok()?;
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });
        Some(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for AcceptingEndpoint {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A loopback port with nothing listening on it: bind, read the port, release.
pub async fn closed_port() -> Option<u16> {
    let listener = bind_loopback("closed port").await?;
    listener.local_addr().ok().map(|a| a.port())
}

/// A loopback listener that never accepts and whose accept queue is already full, so a new
/// handshake stalls until the caller gives up.
pub struct BlackHoleEndpoint {
    addr: SocketAddr,
    _listener: TcpListener,
    _parked: Vec<TcpStream>,
}

impl BlackHoleEndpoint {
    /// `None` when binding is forbidden or the kernel keeps completing handshakes past the
    /// backlog.
    pub async fn start() -> Option<Self> {
        let listener = match Self::listen() {
            Ok(l) => l,
            Err(e) => {
                eprintln!("skipping black hole endpoint: {e}");
                return None;
            }
        };
        let addr = listener.local_addr().ok()?;

        let mut parked = Vec::new();
        for _ in 0..16 {
            match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await
            {
                Ok(Ok(stream)) => parked.push(stream),
                Ok(Err(e)) => {
                    eprintln!("skipping black hole endpoint: {e}");
                    return None;
                }
                // first stalled handshake: the queue is full
                Err(_) => {
                    return Some(Self {
                        addr,
                        _listener: listener,
                        _parked: parked,
                    })
                }
            }
        }
        eprintln!("skipping black hole endpoint: accept queue never filled");
        None
    }

    fn listen() -> std::io::Result<TcpListener> {
        let socket = TcpSocket::new_v4()?;
        socket.bind(SocketAddr::from(([127, 0, 0, 1], 0)))?;
        socket.listen(1)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
