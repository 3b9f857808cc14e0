//! Logger module
//!
//! Server lifecycle logging, access logging in multiple formats, and error
//! and warning output. Until `init` installs the global writer everything
//! falls back to stdout/stderr, so library users and tests need no setup.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::server::BindError;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info(concat!("dirserve ", env!("CARGO_PKG_VERSION")));
    write_info(&format!(
        "Serving directory: {}",
        config.content.root.display()
    ));
    write_info(&format!("Listening on: http://{addr}"));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("Hit CTRL-C to stop");
    write_info("======================================\n");
}

pub fn log_server_stopped() {
    write_info("Server stopped");
}

/// Report why the listening socket could not be created, with enough
/// guidance for the operator to act on it.
pub fn log_bind_failure(error: &BindError) {
    write_error(&format!("Error: {error}"));
    if error.is_addr_in_use() {
        write_error(&format!(
            "Another process is already listening on port {}.",
            error.port()
        ));
    }
    write_error(
        "Try a different port (server.port in config.toml, or DIRSERVE_SERVER__PORT) \
         or stop whatever is using it.",
    );
}

pub fn log_shutdown_signal(signal: &str) {
    write_info(&format!("\n{signal} received, shutting down"));
}

pub fn log_client_disconnect(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Client disconnected: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
