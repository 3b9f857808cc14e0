//! Static file resolution and serving
//!
//! Maps request paths onto the content root and serves what they resolve
//! to: a file, an index file, a redirect to the slashed directory form, or
//! a generated listing. Containment in the root is enforced before any
//! filesystem access.

use crate::config::ContentConfig;
use crate::handler::listing;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a request path resolves to under the content root
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    /// A regular file to serve
    File(PathBuf),
    /// A directory requested without its trailing slash
    Redirect(String),
    /// A directory with no index file, to be listed
    Listing(PathBuf),
}

/// Why a request path cannot be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// Undecodable or malformed path
    BadRequest,
    /// Path escapes the content root
    Forbidden,
    /// Nothing servable at the resolved location
    NotFound,
}

/// Serve a GET/HEAD request path from the content root
///
/// Every resolution outcome is mapped onto its HTTP status here; the
/// caller only stamps standard headers and writes the access log.
pub async fn serve(
    content: &ContentConfig,
    request_path: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match resolve_request_path(content, request_path) {
        Ok(Resolved::File(path)) => serve_file(&path, is_head).await,
        Ok(Resolved::Redirect(location)) => http::build_redirect_response(&location),
        Ok(Resolved::Listing(dir)) => serve_listing(&dir, request_path, is_head).await,
        Err(ResolveError::BadRequest) => http::build_400_response(),
        Err(ResolveError::Forbidden) => http::build_403_response(),
        Err(ResolveError::NotFound) => http::build_404_response(),
    }
}

/// Resolve a request path against the content root
///
/// The path is percent-decoded, then lexically normalized before anything
/// touches the filesystem: `.` and empty segments are dropped, `..` pops,
/// and popping past the root is rejected outright, so an escaping path is
/// refused without ever being opened. Paths that survive are canonicalized
/// and must still sit inside the canonicalized root, which also blocks
/// symlinks that point out of it.
pub fn resolve_request_path(
    content: &ContentConfig,
    request_path: &str,
) -> Result<Resolved, ResolveError> {
    let decoded = urlencoding::decode(request_path).map_err(|_| ResolveError::BadRequest)?;
    if decoded.contains('\0') {
        return Err(ResolveError::BadRequest);
    }

    let Some(relative) = normalize_segments(&decoded) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return Err(ResolveError::Forbidden);
    };

    let root_canonical = match content.root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Content root not found or inaccessible '{}': {e}",
                content.root.display()
            ));
            return Err(ResolveError::NotFound);
        }
    };

    let mut target = root_canonical.clone();
    for segment in &relative {
        target.push(segment);
    }

    // A symlink inside the root may still point outside it.
    let Ok(canonical) = target.canonicalize() else {
        return Err(ResolveError::NotFound);
    };
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        return Err(ResolveError::Forbidden);
    }

    if canonical.is_dir() {
        if !decoded.ends_with('/') && !relative.is_empty() {
            // Redirect to the slashed form so relative links inside the
            // index page resolve against the directory, not its parent.
            return Ok(Resolved::Redirect(format!("{request_path}/")));
        }
        for index_file in &content.index_files {
            let index_path = canonical.join(index_file);
            if index_path.is_file() {
                return Ok(Resolved::File(index_path));
            }
        }
        if content.directory_listing {
            return Ok(Resolved::Listing(canonical));
        }
        return Err(ResolveError::NotFound);
    }

    if canonical.is_file() {
        if decoded.ends_with('/') {
            // A trailing slash promises a directory; this is not one
            return Err(ResolveError::NotFound);
        }
        return Ok(Resolved::File(canonical));
    }

    // Sockets, FIFOs and other non-regular files are not served
    Err(ResolveError::NotFound)
}

/// Lexically normalize a decoded request path into segments relative to
/// the root. Returns `None` when `..` climbs above the root.
fn normalize_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}

/// Read a file and build the 200 response for it
async fn serve_file(path: &Path, is_head: bool) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(contents) => {
            let content_type = mime::content_type_for(path.extension().and_then(|e| e.to_str()));
            http::build_file_response(Bytes::from(contents), content_type, is_head)
        }
        Err(e) => read_failure_response(path, &e),
    }
}

/// Render the generated listing page for a directory
async fn serve_listing(dir: &Path, request_path: &str, is_head: bool) -> Response<Full<Bytes>> {
    // The resolver already decoded this path once, so this cannot fail
    let display_path = match urlencoding::decode(request_path) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(request_path),
    };
    match listing::render_directory(dir, &display_path).await {
        Ok(html) => http::build_html_response(html, is_head),
        Err(e) => read_failure_response(dir, &e),
    }
}

/// Map a filesystem read failure onto a response
///
/// Absent and unreadable both answer 404, so the response does not reveal
/// which it was. Anything else is a genuine server-side failure.
fn read_failure_response(path: &Path, error: &std::io::Error) -> Response<Full<Bytes>> {
    match error.kind() {
        // Racing against a deleted or chmodded file is common enough not
        // to log at error level
        ErrorKind::NotFound | ErrorKind::PermissionDenied => http::build_404_response(),
        _ => {
            logger::log_error(&format!("Failed to read '{}': {error}", path.display()));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ContentConfig) {
        let dir = TempDir::new().unwrap();
        std_fs::write(dir.path().join("index.html"), "<h1>hi</h1>\n").unwrap();
        std_fs::create_dir(dir.path().join("img")).unwrap();
        std_fs::write(dir.path().join("img/logo.png"), b"\x89PNG\r\n\x1a\n").unwrap();
        std_fs::write(dir.path().join("hello world.txt"), "greetings").unwrap();
        let content = ContentConfig {
            root: dir.path().to_path_buf(),
            ..ContentConfig::default()
        };
        (dir, content)
    }

    #[test]
    fn test_resolves_plain_file() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "/img/logo.png").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("img/logo.png")),
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_root_serves_index_file() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "/").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("index.html")),
            other => panic!("expected index file, got {other:?}"),
        }
    }

    #[test]
    fn test_index_files_tried_in_order() {
        let (dir, mut content) = fixture();
        std_fs::write(dir.path().join("index.htm"), "fallback").unwrap();
        content.index_files = vec!["absent.html".to_string(), "index.htm".to_string()];
        let resolved = resolve_request_path(&content, "/").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("index.htm")),
            other => panic!("expected index.htm, got {other:?}"),
        }
    }

    #[test]
    fn test_traversal_is_forbidden() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/../../etc/passwd"),
            Err(ResolveError::Forbidden)
        );
    }

    #[test]
    fn test_encoded_traversal_is_forbidden() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/%2e%2e/%2e%2e/etc/passwd"),
            Err(ResolveError::Forbidden)
        );
    }

    #[test]
    fn test_dotdot_within_root_is_fine() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "/img/../index.html").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("index.html")),
            other => panic!("expected index.html, got {other:?}"),
        }
    }

    #[test]
    fn test_dot_and_empty_segments_collapse() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "//img/./logo.png").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("img/logo.png")),
            other => panic!("expected logo.png, got {other:?}"),
        }
    }

    #[test]
    fn test_percent_decoding_finds_file() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "/hello%20world.txt").unwrap();
        match resolved {
            Resolved::File(path) => assert!(path.ends_with("hello world.txt")),
            other => panic!("expected decoded file, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_bad_request() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/%ff%fe"),
            Err(ResolveError::BadRequest)
        );
    }

    #[test]
    fn test_nul_byte_is_bad_request() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/file%00.txt"),
            Err(ResolveError::BadRequest)
        );
    }

    #[test]
    fn test_file_with_trailing_slash_is_not_found() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/index.html/"),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/missing.txt"),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let content = ContentConfig {
            root: PathBuf::from("/definitely/not/a/real/root"),
            ..ContentConfig::default()
        };
        assert_eq!(
            resolve_request_path(&content, "/"),
            Err(ResolveError::NotFound)
        );
    }

    #[test]
    fn test_directory_without_slash_redirects() {
        let (_dir, content) = fixture();
        assert_eq!(
            resolve_request_path(&content, "/img"),
            Ok(Resolved::Redirect("/img/".to_string()))
        );
    }

    #[test]
    fn test_directory_without_index_lists() {
        let (_dir, content) = fixture();
        let resolved = resolve_request_path(&content, "/img/").unwrap();
        match resolved {
            Resolved::Listing(path) => assert!(path.ends_with("img")),
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[test]
    fn test_listing_disabled_is_not_found() {
        let (_dir, mut content) = fixture();
        content.directory_listing = false;
        assert_eq!(
            resolve_request_path(&content, "/img/"),
            Err(ResolveError::NotFound)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_forbidden() {
        let outside = TempDir::new().unwrap();
        std_fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let (dir, content) = fixture();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("leak.txt"),
        )
        .unwrap();

        assert_eq!(
            resolve_request_path(&content, "/leak.txt"),
            Err(ResolveError::Forbidden)
        );
    }

    #[tokio::test]
    async fn test_listing_title_shows_decoded_path() {
        use http_body_util::BodyExt;

        let (dir, content) = fixture();
        std_fs::create_dir(dir.path().join("my docs")).unwrap();

        let response = serve(&content, "/my%20docs/", false).await;
        assert_eq!(response.status().as_u16(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(body.to_vec()).unwrap();
        assert!(page.contains("Directory listing for /my docs/"));
    }

    #[tokio::test]
    async fn test_serve_maps_statuses() {
        let (_dir, content) = fixture();

        let ok = serve(&content, "/img/logo.png", false).await;
        assert_eq!(ok.status().as_u16(), 200);
        assert_eq!(ok.headers().get("Content-Type").unwrap(), "image/png");

        let missing = serve(&content, "/missing.txt", false).await;
        assert_eq!(missing.status().as_u16(), 404);

        let escape = serve(&content, "/../../etc/passwd", false).await;
        assert_eq!(escape.status().as_u16(), 403);

        let redirect = serve(&content, "/img", false).await;
        assert_eq!(redirect.status().as_u16(), 301);
        assert_eq!(redirect.headers().get("Location").unwrap(), "/img/");
    }
}
