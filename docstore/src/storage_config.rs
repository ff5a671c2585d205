use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the storage adapter.
///
/// An explicit value object — there is no module-level mutable state and
/// no environment sniffing here; the process bootstrap decides what goes
/// in and passes the resulting adapter around.
///
/// Defaults: no remote URI (file backend only), database name
/// `docstore`, data directory `data/`, 5 second connectivity probe, a
/// fixed pool of 5 connections, no normalizer sequence fields.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    remote_uri: Option<String>,
    database: String,
    data_dir: PathBuf,
    probe_timeout: Duration,
    pool_size: u32,
    sequence_fields: Vec<String>,
}

impl StorageConfig {
    pub fn new() -> Self {
        StorageConfig {
            remote_uri: None,
            database: "docstore".to_string(),
            data_dir: PathBuf::from("data"),
            probe_timeout: Duration::from_secs(5),
            pool_size: 5,
            sequence_fields: Vec::new(),
        }
    }

    /// Sets the remote document-store connection string. When set, the
    /// remote backend is tried first at startup.
    pub fn set_remote_uri(&mut self, uri: &str) -> StoreResult<()> {
        if uri.is_empty() {
            log::error!("Remote URI cannot be empty");
            return Err(StoreError::new(
                "Remote URI cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.remote_uri = Some(uri.to_string());
        Ok(())
    }

    pub fn set_database(&mut self, name: &str) -> StoreResult<()> {
        if name.is_empty() {
            log::error!("Database name cannot be empty");
            return Err(StoreError::new(
                "Database name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.database = name.to_string();
        Ok(())
    }

    pub fn set_data_dir(&mut self, path: &Path) -> StoreResult<()> {
        if path.as_os_str().is_empty() {
            log::error!("Data directory cannot be empty");
            return Err(StoreError::new(
                "Data directory cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.data_dir = path.to_path_buf();
        Ok(())
    }

    pub fn set_probe_timeout(&mut self, timeout: Duration) -> StoreResult<()> {
        if timeout.is_zero() {
            log::error!("Probe timeout must be positive");
            return Err(StoreError::new(
                "Probe timeout must be positive",
                ErrorKind::InvalidOperation,
            ));
        }
        self.probe_timeout = timeout;
        Ok(())
    }

    pub fn set_pool_size(&mut self, pool_size: u32) -> StoreResult<()> {
        if pool_size == 0 {
            log::error!("Pool size must be positive");
            return Err(StoreError::new(
                "Pool size must be positive",
                ErrorKind::InvalidOperation,
            ));
        }
        self.pool_size = pool_size;
        Ok(())
    }

    /// Sets the nested-sequence field names the identity normalizer
    /// guarantees on every read.
    pub fn set_sequence_fields(&mut self, fields: &[&str]) -> StoreResult<()> {
        if fields.iter().any(|field| field.is_empty()) {
            log::error!("Sequence field names cannot be empty");
            return Err(StoreError::new(
                "Sequence field names cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }
        self.sequence_fields = fields.iter().map(|field| field.to_string()).collect();
        Ok(())
    }

    pub fn remote_uri(&self) -> Option<&str> {
        self.remote_uri.as_deref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    pub fn sequence_fields(&self) -> &[String] {
        &self.sequence_fields
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::new();
        assert!(config.remote_uri().is_none());
        assert_eq!(config.database(), "docstore");
        assert_eq!(config.data_dir(), Path::new("data"));
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.pool_size(), 5);
        assert!(config.sequence_fields().is_empty());
    }

    #[test]
    fn test_setters() {
        let mut config = StorageConfig::new();
        config.set_remote_uri("mongodb://localhost:27017").unwrap();
        config.set_database("content").unwrap();
        config.set_data_dir(Path::new("/tmp/store")).unwrap();
        config.set_probe_timeout(Duration::from_millis(200)).unwrap();
        config.set_pool_size(2).unwrap();
        config.set_sequence_fields(&["sections", "assets"]).unwrap();

        assert_eq!(config.remote_uri(), Some("mongodb://localhost:27017"));
        assert_eq!(config.database(), "content");
        assert_eq!(config.sequence_fields(), ["sections", "assets"]);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = StorageConfig::new();
        assert!(config.set_remote_uri("").is_err());
        assert!(config.set_database("").is_err());
        assert!(config.set_data_dir(Path::new("")).is_err());
        assert!(config.set_probe_timeout(Duration::ZERO).is_err());
        assert!(config.set_pool_size(0).is_err());
        assert!(config.set_sequence_fields(&["ok", ""]).is_err());

        let err = config.set_pool_size(0).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }
}
