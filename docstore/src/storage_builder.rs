use crate::errors::{StoreError, StoreResult};
use crate::identity::IdentityNormalizer;
use crate::storage::DocStore;
use crate::storage_config::StorageConfig;
use crate::store::{Backend, FileBackend, RemoteBackend};
use std::path::Path;
use std::time::Duration;

/// Builder for opening a [DocStore].
///
/// Follows the fluent builder pattern and captures errors during
/// configuration; the first captured error is returned from
/// [DocStoreBuilder::open] and later calls are no-ops.
///
/// Backend selection happens once, here: when a remote URI is configured
/// the remote backend is probed within the configured timeout, and on
/// failure the adapter falls back to the file backend and logs the
/// fallback. The decision holds for the adapter's lifetime and is never
/// re-evaluated per call.
///
/// # Examples
///
/// ```rust,ignore
/// let store = DocStore::builder()
///     .remote_uri("mongodb://localhost:27017")
///     .database("content")
///     .data_dir("data")
///     .sequence_fields(&["sections", "assets"])
///     .open()?;
/// ```
#[derive(Default)]
pub struct DocStoreBuilder {
    error: Option<StoreError>,
    config: StorageConfig,
}

impl DocStoreBuilder {
    pub fn new() -> Self {
        DocStoreBuilder {
            error: None,
            config: StorageConfig::new(),
        }
    }

    /// Sets the remote document-store connection string.
    pub fn remote_uri(mut self, uri: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_remote_uri(uri) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the remote database name.
    pub fn database(mut self, name: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_database(name) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the data directory of the file backend.
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_data_dir(path.as_ref()) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the startup connectivity probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_probe_timeout(timeout) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the remote connection pool size.
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_pool_size(pool_size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the nested-sequence field names guaranteed by the identity
    /// normalizer.
    pub fn sequence_fields(mut self, fields: &[&str]) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_sequence_fields(fields) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Selects a backend and opens the storage adapter.
    pub fn open(self) -> StoreResult<DocStore> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let config = self.config;
        let normalizer = IdentityNormalizer::new(config.sequence_fields().iter().cloned());

        let backend = match config.remote_uri() {
            Some(uri) => match RemoteBackend::connect(
                uri,
                config.database(),
                config.probe_timeout(),
                config.pool_size(),
            ) {
                Ok(remote) => {
                    log::info!("Storage adapter using the remote backend");
                    Backend::new(remote)
                }
                Err(err) => {
                    log::warn!(
                        "Remote store unavailable, falling back to file storage: {}",
                        err
                    );
                    Backend::new(FileBackend::open(config.data_dir())?)
                }
            },
            None => {
                log::info!(
                    "Storage adapter using the file backend at {}",
                    config.data_dir().display()
                );
                Backend::new(FileBackend::open(config.data_dir())?)
            }
        };

        Ok(DocStore::new(backend, normalizer))
    }
}
