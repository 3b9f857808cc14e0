// Server loop module
// Accepts connections until the shutdown signal fires, then drains.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use super::ServerContext;
use crate::logger;

/// How long shutdown waits for in-flight connections to finish
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(1);

/// Run the accept loop until `shutdown` is notified
///
/// Accept errors are logged and the loop keeps going; nothing that happens
/// on one connection can stop the listener. The only way out is the
/// shutdown signal.
pub async fn run(listener: TcpListener, ctx: Arc<ServerContext>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &ctx),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                break;
            }
        }
    }

    // Close the listening socket first so the port frees immediately,
    // then give in-flight connections a bounded window to finish
    drop(listener);
    drain_connections(&ctx).await;
}

async fn drain_connections(ctx: &ServerContext) {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_DRAIN;
    while ctx.active_connections() > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown drain timed out with {} connection(s) still active",
                ctx.active_connections()
            ));
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
