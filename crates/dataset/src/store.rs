//! Process-lifetime dataset store. The source file never changes during a
//! session, so entries are computed once and never invalidated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use funnel_core::FunnelResult;

use crate::loader::{self, Dataset};

/// Memoized loader keyed by dataset path.
pub struct DatasetStore {
    datasets: DashMap<PathBuf, Arc<Dataset>>,
    unit_cost: f64,
}

impl DatasetStore {
    pub fn new(unit_cost: f64) -> Self {
        Self {
            datasets: DashMap::new(),
            unit_cost,
        }
    }

    /// Load a dataset, reusing the in-memory copy on repeated calls.
    pub fn load(&self, path: &Path) -> FunnelResult<Arc<Dataset>> {
        if let Some(dataset) = self.datasets.get(path) {
            return Ok(dataset.clone());
        }
        let dataset = Arc::new(loader::load_csv(path, self.unit_cost)?);
        self.datasets.insert(path.to_path_buf(), dataset.clone());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("funnelboard_{}_{}.csv", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "date,campaign,user_id,impressions,clicks,installs,purchases,revenue,retained_day_7"
        )
        .unwrap();
        writeln!(file, "2025-06-01,A,user_001,100,10,5,1,50,1").unwrap();
        path
    }

    #[test]
    fn repeated_loads_return_the_same_dataset() {
        let path = write_temp_csv("store");
        let store = DatasetStore::new(0.01);

        let first = store.load(&path).unwrap();
        let second = store.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_a_fatal_load_error() {
        let store = DatasetStore::new(0.01);
        let result = store.load(Path::new("/nonexistent/funnel.csv"));
        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
