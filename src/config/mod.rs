// Configuration module entry point
// Layered startup configuration: compiled-in defaults, an optional TOML
// file, then environment overrides. The result is immutable for the
// lifetime of the server.

mod types;

// Re-export public types
pub use types::{Config, ContentConfig, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

impl Config {
    /// Load configuration from `config.toml` in the working directory
    ///
    /// Missing file is fine; compiled-in defaults cover every key.
    /// Environment variables prefixed with `DIRSERVE_` override both, with
    /// `__` separating sections: `DIRSERVE_SERVER__PORT=9000`.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("DIRSERVE").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("content.root", "public")?
            .set_default("content.index_files", vec!["index.html", "index.htm"])?
            .set_default("content.directory_listing", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default(
                "http.server_name",
                concat!("dirserve/", env!("CARGO_PKG_VERSION")),
            )?
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.content.root, std::path::PathBuf::from("public"));
        assert_eq!(config.content.index_files, vec!["index.html", "index.htm"]);
        assert!(config.content.directory_listing);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.performance.keep_alive_timeout, 75);
        assert!(config.http.server_name.starts_with("dirserve/"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            "[server]\nport = 4321\n\n[content]\nroot = \"site\"\ndirectory_listing = false\n"
        )
        .unwrap();

        let base = dir.path().join("config");
        let config = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.content.root, std::path::PathBuf::from("site"));
        assert!(!config.content.directory_listing);
        // Untouched sections keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.performance.read_timeout, 30);
    }

    #[test]
    fn test_socket_addr_combines_host_and_port() {
        let config = Config::default();
        let addr = config.server.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_socket_addr_rejects_bad_host() {
        let mut config = Config::default();
        config.server.host = "not an address".to_string();
        assert!(config.server.socket_addr().is_err());
    }

    #[test]
    fn test_default_trait_matches_loader_defaults() {
        let loaded = Config::load_from("definitely-not-a-config-file").unwrap();
        let built = Config::default();
        assert_eq!(loaded.server.port, built.server.port);
        assert_eq!(loaded.content.root, built.content.root);
        assert_eq!(loaded.content.index_files, built.content.index_files);
        assert_eq!(loaded.http.server_name, built.http.server_name);
    }
}
