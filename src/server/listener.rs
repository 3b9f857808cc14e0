// Listening socket module
// Binding happens exactly once at startup; failure is fatal and reported
// to the operator with enough context to act on.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Failure to create the listening socket, the one fatal startup error
#[derive(Debug)]
pub struct BindError {
    /// The "host:port" the server tried to bind
    addr: String,
    port: u16,
    source: io::Error,
}

impl BindError {
    pub(crate) fn new(addr: impl Into<String>, port: u16, source: io::Error) -> Self {
        Self {
            addr: addr.into(),
            port,
            source,
        }
    }

    /// The port that could not be bound
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Whether the port was taken by another listener
    pub fn is_addr_in_use(&self) -> bool {
        self.source.kind() == io::ErrorKind::AddrInUse
    }
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to bind {}: {}", self.addr, self.source)
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Create the listening socket for `addr`
///
/// `SO_REUSEADDR` lets a restarted server rebind while old sockets sit in
/// TIME_WAIT. `SO_REUSEPORT` is not set: a second instance on an occupied
/// port must fail loudly instead of silently sharing the traffic.
///
/// Must be called from within a tokio runtime.
pub fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Allow rebinding through TIME_WAIT after a restart
    socket.set_reuse_address(true)?;

    // Non-blocking before the fd is handed to tokio
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_zero_gets_ephemeral_port() {
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_occupied_port_is_addr_in_use() {
        let first = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let taken = first.local_addr().unwrap();

        let err = bind_listener(taken).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[test]
    fn test_bind_error_reports_port_and_cause() {
        let err = BindError::new(
            "127.0.0.1:8000",
            8000,
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );
        assert_eq!(err.port(), 8000);
        assert!(err.is_addr_in_use());
        assert!(err.to_string().contains("127.0.0.1:8000"));
    }
}
