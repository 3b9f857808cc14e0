// Connection handling module
// One spawned task per accepted connection; nothing a connection does can
// affect the accept loop.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::error::Error as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::ServerContext;
use crate::handler;
use crate::logger;

/// Accept a connection, enforce the connection limit, and hand it off
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    ctx: &Arc<ServerContext>,
) {
    // Increment first, then check, so two racing accepts cannot both
    // squeeze under the limit
    let prev_count = ctx.connection_opened();
    if let Some(max_conn) = ctx.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            ctx.connection_closed();
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Rejecting {peer_addr}."
            ));
            drop(stream);
            return;
        }
    }

    handle_connection(stream, peer_addr, Arc::clone(ctx));
}

/// Serve one connection with hyper's HTTP/1 state machine
///
/// The whole connection runs under a deadline derived from the configured
/// read/write timeouts, so a stalled peer cannot hold a slot forever.
fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, ctx: Arc<ServerContext>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &ctx.config.performance;
        let secs = performance.read_timeout.max(performance.write_timeout);
        // Zero would kill connections as they arrive; cap at a day instead
        let deadline = Duration::from_secs(if secs == 0 { 86_400 } else { secs });

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_ctx = Arc::clone(&ctx);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_ctx), peer_addr)),
        );

        match tokio::time::timeout(deadline, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) if is_client_disconnect(&err) => {
                logger::log_client_disconnect(&peer_addr);
            }
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} open longer than {}s, closing",
                    deadline.as_secs()
                ));
            }
        }

        ctx.connection_closed();
    });
}

/// A client that went away mid-exchange is routine, not a server error
fn is_client_disconnect(error: &hyper::Error) -> bool {
    if error.is_incomplete_message() || error.is_canceled() {
        return true;
    }

    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return matches!(
                io_err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            );
        }
        source = err.source();
    }
    false
}
