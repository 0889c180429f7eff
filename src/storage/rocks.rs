//! RocksDB-backed analysis store.
//!
//! The database has two column families: `meta` with the schema and software version, and
//! `analyses` mapping analysis identifiers to JSON-encoded records.

use std::path::Path;
use std::sync::Mutex;

use super::{check_owner, AnalysisStore, StoreError};
use crate::analysis::AnalysisResult;

/// Column family with meta information.
pub const CF_META: &str = "meta";
/// Column family with the analyses.
pub const CF_ANALYSES: &str = "analyses";
/// Version of the record layout in `CF_ANALYSES`.
pub const SCHEMA_VERSION: &str = "1";

/// Analyses in a RocksDB database.
#[derive(derivative::Derivative)]
#[derivative(Debug)]
pub struct RocksDbStore {
    #[derivative(Debug = "ignore")]
    db: rocksdb::DB,
    /// Serializes read-modify-write cycles.
    #[derivative(Debug = "ignore")]
    write_lock: Mutex<()>,
}

impl RocksDbStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut options = rocksdb::Options::default();
        options.create_if_missing(true);
        options.create_missing_column_families(true);
        let db = rocksdb::DB::open_cf(&options, path.as_ref(), [CF_META, CF_ANALYSES])
            .map_err(|e| {
                anyhow::anyhow!(
                    "could not open analysis database {}: {}",
                    path.as_ref().display(),
                    e
                )
            })?;

        {
            let cf_meta = db
                .cf_handle(CF_META)
                .ok_or_else(|| anyhow::anyhow!("missing column family {}", CF_META))?;
            if let Some(version) = db.get_cf(&cf_meta, "schema-version")? {
                if version != SCHEMA_VERSION.as_bytes() {
                    anyhow::bail!(
                        "unsupported analysis database schema version {}",
                        String::from_utf8_lossy(&version)
                    );
                }
            }
            db.put_cf(&cf_meta, "schema-version", SCHEMA_VERSION)?;
            db.put_cf(&cf_meta, "genomeguard-version", crate::common::version())?;
        }

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn load(&self, id: &str) -> Result<AnalysisResult, StoreError> {
        let cf = self.cf_analyses()?;
        let raw = self
            .db
            .get_cf(&cf, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    fn store(&self, analysis: &AnalysisResult) -> Result<(), StoreError> {
        let cf = self.cf_analyses()?;
        let raw = serde_json::to_vec(analysis)?;
        self.db.put_cf(&cf, analysis.id.as_bytes(), raw)?;
        Ok(())
    }

    fn cf_analyses(&self) -> Result<std::sync::Arc<rocksdb::BoundColumnFamily<'_>>, StoreError> {
        self.db
            .cf_handle(CF_ANALYSES)
            .ok_or_else(|| StoreError::Backend(format!("missing column family {}", CF_ANALYSES)))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Backend(String::from("analysis store lock poisoned")))
    }
}

impl AnalysisStore for RocksDbStore {
    fn put(&self, analysis: &AnalysisResult) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        self.store(analysis)
    }

    fn get(&self, owner: &str, id: &str) -> Result<AnalysisResult, StoreError> {
        let analysis = self.load(id)?;
        check_owner(&analysis, owner)?;
        Ok(analysis)
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<AnalysisResult>, StoreError> {
        let cf = self.cf_analyses()?;
        let mut result = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let analysis: AnalysisResult = serde_json::from_slice(&value)?;
            if analysis.owner == owner {
                result.push(analysis);
            }
        }
        // Keys are random identifiers, restore creation order.
        result.sort_by_key(|analysis| analysis.created_at);
        Ok(result)
    }

    fn update(
        &self,
        owner: &str,
        id: &str,
        f: &mut dyn FnMut(&mut AnalysisResult) -> Result<(), StoreError>,
    ) -> Result<AnalysisResult, StoreError> {
        let _guard = self.lock()?;
        let mut analysis = self.load(id)?;
        check_owner(&analysis, owner)?;
        f(&mut analysis)?;
        self.store(&analysis)?;
        Ok(analysis)
    }

    fn delete(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let analysis = self.load(id)?;
        check_owner(&analysis, owner)?;
        let cf = self.cf_analyses()?;
        self.db.delete_cf(&cf, id.as_bytes())?;
        Ok(())
    }
}
