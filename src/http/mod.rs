//! HTTP protocol layer module
//!
//! Content-type detection and response builders, decoupled from path
//! resolution and the filesystem.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    apply_standard_headers, build_400_response, build_403_response, build_404_response,
    build_405_response, build_500_response, build_file_response, build_html_response,
    build_redirect_response,
};
