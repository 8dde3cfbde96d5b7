use super::loader::Dataset;
use crate::config::DataPaths;
use crate::error::Result;
use std::collections::HashMap;
use std::rc::Rc;

/// Session cache of loaded datasets, owned by the composition root.
///
/// Loading the same pair of paths twice hands back the first `Rc` without
/// touching disk again.
#[derive(Default)]
pub struct DataCache {
    entries: HashMap<DataPaths, Rc<Dataset>>,
    disk_loads: usize,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, paths: &DataPaths) -> Result<Rc<Dataset>> {
        if let Some(dataset) = self.entries.get(paths) {
            tracing::debug!(transactions = %paths.transactions.display(), "dataset cache hit");
            return Ok(Rc::clone(dataset));
        }

        let dataset = Rc::new(Dataset::load(paths)?);
        self.disk_loads += 1;
        self.entries.insert(paths.clone(), Rc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of times a dataset was actually read from disk
    pub fn disk_loads(&self) -> usize {
        self.disk_loads
    }
}
