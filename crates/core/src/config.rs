//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the executor and the
//! router. Nothing reads process-wide environment variables during request handling; the
//! `*_from_env_value` helpers take the raw value so the binaries decide where it comes from.

use crate::constants::{DEFAULT_POOL_SIZE, DEFAULT_PORT, VIEWS_DIR};
use crate::{HastaneError, HastaneResult};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct HastaneConfig {
    database_url: String,
    port: u16,
    pool_size: u32,
    views_dir: PathBuf,
}

impl HastaneConfig {
    pub fn new(
        database_url: String,
        port: u16,
        pool_size: u32,
        views_dir: PathBuf,
    ) -> HastaneResult<Self> {
        if database_url.trim().is_empty() {
            return Err(HastaneError::InvalidConfig(
                "database url cannot be empty".into(),
            ));
        }
        if pool_size == 0 {
            return Err(HastaneError::InvalidConfig(
                "pool size must be at least 1".into(),
            ));
        }

        Ok(Self {
            database_url,
            port,
            pool_size,
            views_dir,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address the HTTP server binds: every interface, configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    pub fn views_dir(&self) -> &Path {
        &self.views_dir
    }

    /// Connection options for the pool.
    ///
    /// Unless the connection string pins an `sslmode`, TLS is required but the server
    /// certificate is not verified.
    pub fn connect_options(&self) -> HastaneResult<PgConnectOptions> {
        let options =
            PgConnectOptions::from_str(&self.database_url).map_err(HastaneError::DatabaseUrl)?;
        if self.database_url.contains("sslmode=") {
            Ok(options)
        } else {
            Ok(options.ssl_mode(PgSslMode::Require))
        }
    }
}

/// Parse the listening port. Missing or blank values fall back to [`DEFAULT_PORT`].
pub fn port_from_env_value(value: Option<String>) -> HastaneResult<u16> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<u16>()
            .map_err(|source| HastaneError::InvalidPort { value: v, source }),
        None => Ok(DEFAULT_PORT),
    }
}

/// Parse the pool size. Missing or blank values fall back to [`DEFAULT_POOL_SIZE`].
pub fn pool_size_from_env_value(value: Option<String>) -> HastaneResult<u32> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<u32>()
            .map_err(|source| HastaneError::InvalidPoolSize { value: v, source }),
        None => Ok(DEFAULT_POOL_SIZE),
    }
}

/// Require a database url.
pub fn database_url_from_env_value(value: Option<String>) -> HastaneResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(HastaneError::MissingEnv("DATABASE_URL"))
}

/// Resolve the views directory.
///
/// An override must be an existing directory. Otherwise this looks for [`VIEWS_DIR`] relative
/// to the current working directory and then walks up from `CARGO_MANIFEST_DIR`.
pub fn resolve_views_dir(override_dir: Option<PathBuf>) -> HastaneResult<PathBuf> {
    if let Some(dir) = override_dir {
        if dir.is_dir() {
            return Ok(dir);
        }
        return Err(HastaneError::InvalidConfig(format!(
            "HASTANE_VIEWS_DIR override is not a directory: {}",
            dir.display()
        )));
    }

    let cwd_relative = PathBuf::from(VIEWS_DIR);
    if cwd_relative.is_dir() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(VIEWS_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    Err(HastaneError::InvalidConfig(format!(
        "could not locate {VIEWS_DIR}/ directory"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cfg(url: &str) -> HastaneConfig {
        HastaneConfig::new(url.into(), 3000, 10, PathBuf::from("views"))
            .expect("HastaneConfig::new should succeed")
    }

    #[test]
    fn rejects_empty_url_and_zero_pool() {
        assert!(matches!(
            HastaneConfig::new("  ".into(), 3000, 10, PathBuf::new()),
            Err(HastaneError::InvalidConfig(_))
        ));
        assert!(matches!(
            HastaneConfig::new("postgres://localhost/db".into(), 3000, 0, PathBuf::new()),
            Err(HastaneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn port_defaults_and_parses() {
        assert_eq!(port_from_env_value(None).unwrap(), DEFAULT_PORT);
        assert_eq!(port_from_env_value(Some(" ".into())).unwrap(), DEFAULT_PORT);
        assert_eq!(port_from_env_value(Some("8080".into())).unwrap(), 8080);
        assert!(matches!(
            port_from_env_value(Some("http".into())),
            Err(HastaneError::InvalidPort { value, .. }) if value == "http"
        ));
    }

    #[test]
    fn pool_size_defaults_and_parses() {
        assert_eq!(pool_size_from_env_value(None).unwrap(), DEFAULT_POOL_SIZE);
        assert_eq!(pool_size_from_env_value(Some("4".into())).unwrap(), 4);
        assert!(pool_size_from_env_value(Some("-1".into())).is_err());
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(
            database_url_from_env_value(None),
            Err(HastaneError::MissingEnv("DATABASE_URL"))
        ));
        assert_eq!(
            database_url_from_env_value(Some("postgres://h/db".into())).unwrap(),
            "postgres://h/db"
        );
    }

    #[test]
    fn listen_addr_binds_all_interfaces() {
        let cfg = test_cfg("postgres://localhost/hastane");
        assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn tls_is_required_unless_url_pins_sslmode() {
        let cfg = test_cfg("postgres://user:pw@localhost/hastane");
        let options = cfg.connect_options().unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));

        let cfg = test_cfg("postgres://user:pw@localhost/hastane?sslmode=disable");
        let options = cfg.connect_options().unwrap();
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Disable));
    }

    #[test]
    fn views_dir_override_must_exist() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let resolved = resolve_views_dir(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, temp_dir.path());

        let missing = temp_dir.path().join("missing");
        assert!(resolve_views_dir(Some(missing)).is_err());
    }

    #[test]
    fn views_dir_resolves_from_workspace() {
        let resolved = resolve_views_dir(None).unwrap();
        assert!(resolved.ends_with(VIEWS_DIR));
        assert!(resolved.join("layout.html").is_file());
    }
}
