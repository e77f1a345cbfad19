//! A store that keeps everything in memory.

use super::{finish_record, new_record, Store};
use crate::{
    board::Board,
    config::Config,
    error::Error,
    record::{ExperimentId, ExperimentRecord, GenerationRecord, RunStatus},
};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
    time::SystemTime,
};

/// A store that keeps everything in memory.
///
/// Ids start from 1. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: ExperimentId,
    experiments: BTreeMap<ExperimentId, ExperimentRecord>,
    traces: BTreeMap<ExperimentId, Vec<GenerationRecord>>,
}

impl Inner {
    fn record_mut(&mut self, id: ExperimentId) -> Result<&mut ExperimentRecord, Error> {
        self.experiments
            .get_mut(&id)
            .ok_or(Error::ExperimentNotFound(id))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, Error> {
        self.inner.lock().map_err(|_| Error::PoisonError)
    }
}

impl Store for MemoryStore {
    fn create_experiment(
        &self,
        config: &Config,
        initial: &Board,
        start_time: SystemTime,
    ) -> Result<ExperimentId, Error> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let id = inner.last_id;
        inner
            .experiments
            .insert(id, new_record(id, config, initial, start_time));
        inner.traces.insert(id, Vec::new());
        Ok(id)
    }

    fn set_status(&self, id: ExperimentId, status: RunStatus) -> Result<(), Error> {
        self.lock()?.record_mut(id)?.status = status;
        Ok(())
    }

    fn complete(&self, id: ExperimentId, end_time: SystemTime) -> Result<(), Error> {
        finish_record(self.lock()?.record_mut(id)?, end_time);
        Ok(())
    }

    fn append_generation(&self, record: &GenerationRecord) -> Result<(), Error> {
        let id = record.experiment_id;
        self.lock()?
            .traces
            .get_mut(&id)
            .ok_or(Error::ExperimentNotFound(id))?
            .push(record.clone());
        Ok(())
    }

    fn experiment(&self, id: ExperimentId) -> Result<ExperimentRecord, Error> {
        self.lock()?
            .experiments
            .get(&id)
            .cloned()
            .ok_or(Error::ExperimentNotFound(id))
    }

    fn trace(&self, id: ExperimentId) -> Result<Vec<GenerationRecord>, Error> {
        let mut trace = self
            .lock()?
            .traces
            .get(&id)
            .cloned()
            .ok_or(Error::ExperimentNotFound(id))?;
        trace.sort_by_key(|r| r.generation);
        Ok(trace)
    }

    fn experiments(&self) -> Result<Vec<ExperimentRecord>, Error> {
        Ok(self.lock()?.experiments.values().cloned().collect())
    }
}
