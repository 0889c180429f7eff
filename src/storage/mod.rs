//! Persistence of analysis records.
//!
//! All access goes through [`AnalysisStore`] and is scoped by owner: reading, updating or
//! deleting an analysis of another owner yields [`StoreError::Forbidden`].

use std::path::Path;
use std::sync::Arc;

use crate::analysis::{AnalysisResult, InvalidTransition};

pub mod memory;
pub mod rocks;

/// Error type of the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("analysis not found: {0}")]
    NotFound(String),

    #[error("access denied to analysis: {0}")]
    Forbidden(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Owner-scoped storage of analyses.
pub trait AnalysisStore: Send + Sync {
    /// Insert or replace an analysis, keyed by its identifier.
    fn put(&self, analysis: &AnalysisResult) -> Result<(), StoreError>;

    /// Fetch the analysis `id` of `owner`.
    fn get(&self, owner: &str, id: &str) -> Result<AnalysisResult, StoreError>;

    /// All analyses of `owner` in creation order.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<AnalysisResult>, StoreError>;

    /// Apply `f` to the analysis `id` of `owner` and store the result.
    ///
    /// If `f` fails, the stored record is left unchanged.
    fn update(
        &self,
        owner: &str,
        id: &str,
        f: &mut dyn FnMut(&mut AnalysisResult) -> Result<(), StoreError>,
    ) -> Result<AnalysisResult, StoreError>;

    /// Remove the analysis `id` of `owner`.
    fn delete(&self, owner: &str, id: &str) -> Result<(), StoreError>;
}

/// Check that `analysis` belongs to `owner`.
pub(crate) fn check_owner(analysis: &AnalysisResult, owner: &str) -> Result<(), StoreError> {
    if analysis.owner == owner {
        Ok(())
    } else {
        Err(StoreError::Forbidden(analysis.id.clone()))
    }
}

/// Open the store: RocksDB at `path_db` if given, in-memory otherwise.
pub fn open_store(path_db: Option<&Path>) -> Result<Arc<dyn AnalysisStore>, anyhow::Error> {
    match path_db {
        Some(path) => {
            tracing::info!("Opening RocksDB analysis store at {}", path.display());
            Ok(Arc::new(rocks::RocksDbStore::open(path)?))
        }
        None => {
            tracing::info!("Using in-memory analysis store");
            Ok(Arc::new(memory::InMemoryStore::default()))
        }
    }
}

/// Behavior shared by all store implementations.
#[cfg(test)]
pub(crate) mod conformance {
    use pretty_assertions::assert_eq;

    use super::{AnalysisStore, StoreError};
    use crate::analysis::{AnalysisResult, AnalysisStatus};

    pub fn put_and_get(store: &dyn AnalysisStore) -> Result<(), anyhow::Error> {
        let analysis = AnalysisResult::new("alice", "a.vcf");
        store.put(&analysis)?;

        assert_eq!(store.get("alice", &analysis.id)?, analysis);
        assert!(matches!(
            store.get("alice", "no-such-id"),
            Err(StoreError::NotFound(_))
        ));

        Ok(())
    }

    pub fn owner_isolation(store: &dyn AnalysisStore) -> Result<(), anyhow::Error> {
        let analysis = AnalysisResult::new("alice", "a.vcf");
        store.put(&analysis)?;

        assert!(matches!(
            store.get("bob", &analysis.id),
            Err(StoreError::Forbidden(_))
        ));
        assert!(matches!(
            store.delete("bob", &analysis.id),
            Err(StoreError::Forbidden(_))
        ));
        assert!(matches!(
            store.update("bob", &analysis.id, &mut |a| Ok(a.start()?)),
            Err(StoreError::Forbidden(_))
        ));
        assert!(store.list_by_owner("bob")?.is_empty());
        assert_eq!(store.get("alice", &analysis.id)?, analysis);

        Ok(())
    }

    pub fn list_in_creation_order(store: &dyn AnalysisStore) -> Result<(), anyhow::Error> {
        let mut ids = Vec::new();
        for i in 0..5 {
            let analysis = AnalysisResult::new("alice", &format!("{}.vcf", i));
            store.put(&analysis)?;
            ids.push(analysis.id);
            store.put(&AnalysisResult::new("bob", "b.vcf"))?;
        }

        let listed: Vec<_> = store
            .list_by_owner("alice")?
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(listed, ids);
        assert_eq!(store.list_by_owner("bob")?.len(), 5);

        Ok(())
    }

    pub fn update(store: &dyn AnalysisStore) -> Result<(), anyhow::Error> {
        let analysis = AnalysisResult::new("alice", "a.vcf");
        store.put(&analysis)?;

        let updated = store.update("alice", &analysis.id, &mut |a| Ok(a.start()?))?;
        assert_eq!(updated.status, AnalysisStatus::Processing);
        assert_eq!(store.get("alice", &analysis.id)?, updated);

        // A failing update keeps the stored record.
        let res = store.update("alice", &analysis.id, &mut |a| {
            a.filename = String::from("changed.vcf");
            a.start()?;
            Ok(())
        });
        assert!(matches!(res, Err(StoreError::InvalidTransition(_))));
        assert_eq!(store.get("alice", &analysis.id)?, updated);

        assert!(matches!(
            store.update("alice", "no-such-id", &mut |_| Ok(())),
            Err(StoreError::NotFound(_))
        ));

        Ok(())
    }

    pub fn delete(store: &dyn AnalysisStore) -> Result<(), anyhow::Error> {
        let analysis = AnalysisResult::new("alice", "a.vcf");
        store.put(&analysis)?;

        store.delete("alice", &analysis.id)?;
        assert!(matches!(
            store.get("alice", &analysis.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("alice", &analysis.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(store.list_by_owner("alice")?.is_empty());

        Ok(())
    }
}
