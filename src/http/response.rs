//! HTTP response building module
//!
//! Builders for every response shape the server emits, decoupled from path
//! resolution. All bodies are complete and sized up front, so every
//! response carries an explicit Content-Length.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, DATE, SERVER};
use hyper::Response;

/// Build a plain-text response for an HTTP error status
fn text_response(status: u16, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", body.len())
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<Full<Bytes>> {
    text_response(400, "400 Bad Request")
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    text_response(403, "403 Forbidden")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    text_response(404, "404 Not Found")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    text_response(500, "500 Internal Server Error")
}

/// Build 405 Method Not Allowed response
///
/// Only GET and HEAD are served, and the Allow header says so.
pub fn build_405_response() -> Response<Full<Bytes>> {
    const BODY: &str = "405 Method Not Allowed";
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", BODY.len())
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from_static(BODY.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(405, &e);
            Response::new(Full::new(Bytes::from_static(BODY.as_bytes())))
        })
}

/// Build 301 redirect response
///
/// Used when a directory is requested without its trailing slash, so that
/// relative links inside its index page resolve correctly.
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    const BODY: &str = "301 Moved Permanently";
    Response::builder()
        .status(301)
        .header("Location", location)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", BODY.len())
        .body(Full::new(Bytes::from_static(BODY.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(301, &e);
            Response::new(Full::new(Bytes::from_static(BODY.as_bytes())))
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(200, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build success response for file contents
///
/// HEAD responses keep the real Content-Length but send an empty body.
pub fn build_file_response(
    data: Bytes,
    content_type: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(200, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Stamp the Date and Server headers onto an outgoing response
pub fn apply_standard_headers(response: &mut Response<Full<Bytes>>, server_name: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&httpdate_now()) {
        headers.insert(DATE, value);
    }
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
}

/// Current time as an IMF-fixdate string, always GMT
fn httpdate_now() -> String {
    chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
