// Server module entry point
// Binding, the accept loop, per-connection tasks, and shutdown signalling.
// A server has exactly two states: bound, and serving until shutdown.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module gets an explicit path
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::Config;

// Re-export commonly used types
pub use listener::BindError;

/// Shared immutable view handed to every connection task
#[derive(Debug)]
pub struct ServerContext {
    pub config: Config,
    active_connections: AtomicUsize,
}

impl ServerContext {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Record an accepted connection; returns the previous count
    pub(crate) fn connection_opened(&self) -> usize {
        self.active_connections.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    /// Connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

/// A bound static file server, ready to serve
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
    ctx: Arc<ServerContext>,
}

impl Server {
    /// Bind the address named by the configuration
    ///
    /// Binding happens once, up front; an occupied port or any other
    /// failure comes back as a `BindError` and is fatal to startup. Must
    /// be called from within a tokio runtime.
    pub fn bind(config: Config) -> Result<Self, BindError> {
        let listen_addr = format!("{}:{}", config.server.host, config.server.port);
        let port = config.server.port;

        let requested = config.server.socket_addr().map_err(|e| {
            BindError::new(
                &listen_addr,
                port,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid listen address: {e}"),
                ),
            )
        })?;

        let tcp_listener =
            listener::bind_listener(requested).map_err(|e| BindError::new(&listen_addr, port, e))?;
        let addr = tcp_listener
            .local_addr()
            .map_err(|e| BindError::new(&listen_addr, port, e))?;

        Ok(Self {
            listener: tcp_listener,
            addr,
            ctx: Arc::new(ServerContext::new(config)),
        })
    }

    /// The address actually bound; with port 0 this carries the
    /// OS-assigned port
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The configuration the server runs with
    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Serve until `shutdown` is notified
    ///
    /// Consumes the server; when this returns, the listening socket is
    /// closed and in-flight connections have been given a drain window.
    pub async fn serve(self, shutdown: Arc<Notify>) {
        server_loop::run(self.listener, self.ctx, shutdown).await;
    }
}
