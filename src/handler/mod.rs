//! Request handler module
//!
//! Method validation, path resolution against the content root, and the
//! responses that fall out of it: files, index pages, redirects, listings,
//! and the error statuses.

pub mod listing;
pub mod request;
pub mod static_files;

// Re-export main entry point
pub use request::handle_request;
