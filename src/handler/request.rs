//! Request entry point
//!
//! Validates the method, hands GET/HEAD to the static file handler, stamps
//! the standard response headers, and writes the access log entry. There
//! is no routing layer; every request path maps straight onto the content
//! root.

use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::server::ServerContext;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Handle one HTTP exchange
///
/// Never fails: every outcome, including rejected methods and unservable
/// paths, becomes a complete response.
pub async fn handle_request<B>(
    req: Request<B>,
    ctx: Arc<ServerContext>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let query = req.uri().query().map(ToOwned::to_owned);
    let version = req.version();
    let referer = header_value(&req, "referer");
    let user_agent = header_value(&req, "user-agent");

    let is_head = method == Method::HEAD;
    let mut response = match method {
        Method::GET | Method::HEAD => {
            static_files::serve(&ctx.config.content, &path, is_head).await
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    http::apply_standard_headers(&mut response, &ctx.config.http.server_name);

    if ctx.config.logging.access_log {
        let mut entry = AccessLogEntry::new(remote_addr, &method, path);
        entry.query = query;
        entry.http_version = version_label(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = if is_head { 0 } else { body_len(&response) };
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &ctx.config.logging.access_log_format);
    }

    Ok(response)
}

/// Extract a header as an owned string, if present and readable
fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Number of body bytes that will go on the wire
fn body_len(response: &Response<Full<Bytes>>) -> usize {
    usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX)
}

/// HTTP version as it appears in the access log request line
fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ContentConfig, LoggingConfig};
    use tempfile::TempDir;

    fn test_context(root: &std::path::Path) -> Arc<ServerContext> {
        let config = Config {
            content: ContentConfig {
                root: root.to_path_buf(),
                ..ContentConfig::default()
            },
            logging: LoggingConfig {
                access_log: false,
                ..LoggingConfig::default()
            },
            ..Config::default()
        };
        Arc::new(ServerContext::new(config))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:54321".parse().unwrap()
    }

    fn request(method: &str, path: &str) -> Request<()> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_serves_file_with_standard_headers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>\n").unwrap();
        let ctx = test_context(dir.path());

        let response = handle_request(request("GET", "/"), ctx, peer()).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(response.headers().get("Content-Length").unwrap(), "12");
        assert!(response.headers().contains_key("Date"));
        assert!(response
            .headers()
            .get("Server")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("dirserve/"));
    }

    #[tokio::test]
    async fn test_head_keeps_headers_drops_body() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>\n").unwrap();
        let ctx = test_context(dir.path());

        let response = handle_request(request("HEAD", "/"), ctx, peer())
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.headers().get("Content-Length").unwrap(), "12");
        assert_eq!(response.body().size_hint().exact(), Some(0));
    }

    #[tokio::test]
    async fn test_post_is_rejected_with_allow() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());

        let response = handle_request(request("POST", "/"), ctx, peer())
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 405);
        assert_eq!(response.headers().get("Allow").unwrap(), "GET, HEAD");
    }

    #[tokio::test]
    async fn test_options_is_rejected() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path());

        let response = handle_request(request("OPTIONS", "/"), ctx, peer())
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 405);
    }

    #[test]
    fn test_version_labels() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
