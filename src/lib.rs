//! A static file server for local development
//!
//! `dirserve` exposes one directory over HTTP on a local port, so a web
//! bundle can be previewed in a browser while it is being built. It serves
//! files with extension-derived content types, `index.html` for
//! directories, and a generated listing when there is none. Nothing
//! outside the configured root directory is ever reachable.
//!
//! The server binds its port exactly once at startup; a port that is
//! already taken is a fatal, clearly-reported error rather than something
//! to fall back from.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::Notify;
//!
//! # async fn run() {
//! let config = dirserve::Config::load().expect("configuration");
//! let server = dirserve::Server::bind(config).expect("bind");
//! println!("See http://{}", server.local_addr());
//!
//! // Trip the Notify (from a signal handler or a test) to stop serving
//! server.serve(Arc::new(Notify::new())).await;
//! # }
//! ```

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use server::{BindError, Server};
