//! Generated directory listings
//!
//! Rendered when a directory has no index file and listings are enabled.
//! Directories come first, then files, each group sorted
//! case-insensitively; hrefs are percent-encoded and display names
//! HTML-escaped, so odd filenames cannot break the page.

use std::io;
use std::path::Path;
use tokio::fs;

/// Render the listing page for `dir`, presented as `request_path`
pub async fn render_directory(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut entries = fs::read_dir(dir).await?;
    let mut directories = Vec::new();
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            directories.push(name);
        } else {
            files.push(name);
        }
    }

    directories.sort_by_key(|name| name.to_lowercase());
    files.sort_by_key(|name| name.to_lowercase());

    let mut items = String::new();
    for name in &directories {
        push_entry(&mut items, name, true);
    }
    for name in &files {
        push_entry(&mut items, name, false);
    }

    let title = format!("Directory listing for {}", escape_html(request_path));
    Ok(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <hr>\n\
         <ul>\n\
         {items}</ul>\n\
         <hr>\n\
         </body>\n\
         </html>\n"
    ))
}

/// Append one `<li>` entry; directories get a trailing slash in both the
/// link and the label
fn push_entry(items: &mut String, name: &str, is_dir: bool) {
    let slash = if is_dir { "/" } else { "" };
    items.push_str(&format!(
        "<li><a href=\"{href}{slash}\">{label}{slash}</a></li>\n",
        href = urlencoding::encode(name),
        label = escape_html(name),
    ));
}

/// Escape text for embedding in HTML
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
