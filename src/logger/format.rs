//! Access log format module
//!
//! Supports three log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//!
//! Unknown format names fall back to `combined`.

use chrono::Local;
use hyper::Method;
use std::net::SocketAddr;

/// One access log line's worth of request and response data
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Peer address, ip:port
    pub remote_addr: String,
    /// When the entry was recorded
    pub time: chrono::DateTime<Local>,
    /// HTTP method, including rejected ones
    pub method: String,
    /// Request path as received, before decoding
    pub path: String,
    /// Query string, without the `?`
    pub query: Option<String>,
    /// HTTP version as shown in the request line
    pub http_version: String,
    /// Response status code
    pub status: u16,
    /// Body bytes put on the wire, 0 for HEAD
    pub body_bytes: usize,
    /// Referer request header, if sent
    pub referer: Option<String>,
    /// User-Agent request header, if sent
    pub user_agent: Option<String>,
    /// Time spent handling the request, microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create an entry stamped with the current time
    pub fn new(remote_addr: SocketAddr, method: &Method, path: String) -> Self {
        Self {
            remote_addr: remote_addr.to_string(),
            time: Local::now(),
            method: method.to_string(),
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// Apache/Nginx Combined Log Format
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{} HTTP/{}\" {} {} \"{}\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query_suffix(),
            self.http_version,
            self.status,
            self.body_bytes,
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query_suffix(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Query string with its leading `?`, or nothing
    fn query_suffix(&self) -> String {
        match &self.query {
            Some(q) => format!("?{q}"),
            None => String::new(),
        }
    }

    /// JSON structured log format, one object per line
    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
