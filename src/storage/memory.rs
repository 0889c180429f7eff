//! In-memory analysis store.

use std::sync::RwLock;

use indexmap::IndexMap;

use super::{check_owner, AnalysisStore, StoreError};
use crate::analysis::AnalysisResult;

/// Analyses held in an insertion-ordered map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    analyses: RwLock<IndexMap<String, AnalysisResult>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend(String::from("analysis store lock poisoned"))
}

impl AnalysisStore for InMemoryStore {
    fn put(&self, analysis: &AnalysisResult) -> Result<(), StoreError> {
        let mut analyses = self.analyses.write().map_err(poisoned)?;
        analyses.insert(analysis.id.clone(), analysis.clone());
        Ok(())
    }

    fn get(&self, owner: &str, id: &str) -> Result<AnalysisResult, StoreError> {
        let analyses = self.analyses.read().map_err(poisoned)?;
        let analysis = analyses
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        check_owner(analysis, owner)?;
        Ok(analysis.clone())
    }

    fn list_by_owner(&self, owner: &str) -> Result<Vec<AnalysisResult>, StoreError> {
        let analyses = self.analyses.read().map_err(poisoned)?;
        Ok(analyses
            .values()
            .filter(|analysis| analysis.owner == owner)
            .cloned()
            .collect())
    }

    fn update(
        &self,
        owner: &str,
        id: &str,
        f: &mut dyn FnMut(&mut AnalysisResult) -> Result<(), StoreError>,
    ) -> Result<AnalysisResult, StoreError> {
        let mut analyses = self.analyses.write().map_err(poisoned)?;
        let stored = analyses
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        check_owner(stored, owner)?;

        let mut analysis = stored.clone();
        f(&mut analysis)?;
        *stored = analysis.clone();
        Ok(analysis)
    }

    fn delete(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        let mut analyses = self.analyses.write().map_err(poisoned)?;
        let analysis = analyses
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        check_owner(analysis, owner)?;
        // Keep the remaining entries in creation order.
        analyses.shift_remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::InMemoryStore;

    #[rstest::rstest]
    #[case::put_and_get(crate::storage::conformance::put_and_get)]
    #[case::owner_isolation(crate::storage::conformance::owner_isolation)]
    #[case::list_in_creation_order(crate::storage::conformance::list_in_creation_order)]
    #[case::update(crate::storage::conformance::update)]
    #[case::delete(crate::storage::conformance::delete)]
    fn conformance(
        #[case] check: fn(&dyn crate::storage::AnalysisStore) -> Result<(), anyhow::Error>,
    ) -> Result<(), anyhow::Error> {
        check(&InMemoryStore::default())
    }

    #[test]
    fn concurrent_puts() -> Result<(), anyhow::Error> {
        let store = std::sync::Arc::new(InMemoryStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let analysis =
                        crate::analysis::AnalysisResult::new("alice", &format!("{}.vcf", i));
                    crate::storage::AnalysisStore::put(store.as_ref(), &analysis)
                })
            })
            .collect();
        for handle in handles {
            handle.join().map_err(|_| anyhow::anyhow!("thread panicked"))??;
        }

        assert_eq!(
            crate::storage::AnalysisStore::list_by_owner(store.as_ref(), "alice")?.len(),
            8
        );

        Ok(())
    }
}
