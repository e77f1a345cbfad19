//! A store that keeps experiments as JSON files in a directory.
//!
//! Layout:
//!
//! * `experiments/{id}.json`: the experiment record, rewritten on each
//!   status change;
//! * `traces/{id}.jsonl`: one generation record per line, append only.

use super::{finish_record, new_record, Store};
use crate::{
    board::Board,
    config::Config,
    error::Error,
    record::{ExperimentId, ExperimentRecord, GenerationRecord, RunStatus},
};
use std::{
    fs::{self, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    time::SystemTime,
};

const EXPERIMENTS: &str = "experiments";
const TRACES: &str = "traces";

/// A store that keeps experiments as JSON files in a directory.
///
/// Several processes may read the same directory, but only one process
/// should write to it at a time.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Serializes writers within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directories if needed.
    pub fn open<P: Into<PathBuf>>(root: P) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(root.join(EXPERIMENTS))?;
        fs::create_dir_all(root.join(TRACES))?;
        Ok(FileStore {
            root,
            lock: Mutex::new(()),
        })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn experiment_path(&self, id: ExperimentId) -> PathBuf {
        self.root.join(EXPERIMENTS).join(format!("{}.json", id))
    }

    fn trace_path(&self, id: ExperimentId) -> PathBuf {
        self.root.join(TRACES).join(format!("{}.jsonl", id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, Error> {
        self.lock.lock().map_err(|_| Error::PoisonError)
    }

    fn read_record(&self, id: ExperimentId) -> Result<ExperimentRecord, Error> {
        match fs::read(self.experiment_path(id)) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::ExperimentNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temporary file first, so readers never see half a record.
    fn write_record(&self, record: &ExperimentRecord) -> Result<(), Error> {
        let path = self.experiment_path(record.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn update<F>(&self, id: ExperimentId, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ExperimentRecord),
    {
        let _guard = self.lock()?;
        let mut record = self.read_record(id)?;
        f(&mut record);
        self.write_record(&record)
    }

    /// Ids of all stored experiments, in increasing order.
    fn ids(&self) -> Result<Vec<ExperimentId>, Error> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.root.join(EXPERIMENTS))? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse().ok())
                {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

impl Store for FileStore {
    fn create_experiment(
        &self,
        config: &Config,
        initial: &Board,
        start_time: SystemTime,
    ) -> Result<ExperimentId, Error> {
        let _guard = self.lock()?;
        let id = self.ids()?.last().map_or(1, |last| last + 1);
        self.write_record(&new_record(id, config, initial, start_time))?;
        Ok(id)
    }

    fn set_status(&self, id: ExperimentId, status: RunStatus) -> Result<(), Error> {
        self.update(id, |record| record.status = status)
    }

    fn complete(&self, id: ExperimentId, end_time: SystemTime) -> Result<(), Error> {
        self.update(id, |record| finish_record(record, end_time))
    }

    fn append_generation(&self, record: &GenerationRecord) -> Result<(), Error> {
        let id = record.experiment_id;
        let _guard = self.lock()?;
        if !self.experiment_path(id).exists() {
            return Err(Error::ExperimentNotFound(id));
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.trace_path(id))?;
        file.write_all(&line)?;
        Ok(())
    }

    fn experiment(&self, id: ExperimentId) -> Result<ExperimentRecord, Error> {
        self.read_record(id)
    }

    fn trace(&self, id: ExperimentId) -> Result<Vec<GenerationRecord>, Error> {
        let file = match fs::File::open(self.trace_path(id)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Known experiment that has not recorded anything yet.
                self.read_record(id)?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut trace = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                trace.push(serde_json::from_str::<GenerationRecord>(&line)?);
            }
        }
        trace.sort_by_key(|r| r.generation);
        Ok(trace)
    }

    fn experiments(&self) -> Result<Vec<ExperimentRecord>, Error> {
        self.ids()?
            .into_iter()
            .map(|id| self.read_record(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        env,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    /// A fresh directory under the system temp dir.
    fn scratch_dir() -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = env::temp_dir().join(format!(
            "lifetrace-file-store-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn persists_across_opens() -> Result<(), Error> {
        let dir = scratch_dir();
        let board = Board::from_rows(vec![[0u8, 1], [1, 0]])?;
        let start = SystemTime::now();

        let id = {
            let store = FileStore::open(&dir)?;
            let config = Config::new(2, 2).set_name("persist");
            let id = store.create_experiment(&config, &board, start)?;
            assert_eq!(store.trace(id)?, Vec::new());
            store.set_status(id, RunStatus::Running)?;
            store.append_generation(&GenerationRecord::capture(id, 0, &board))?;
            store.append_generation(&GenerationRecord::capture(id, 1, &board))?;
            store.complete(id, start + Duration::from_millis(1500))?;
            id
        };

        let store = FileStore::open(&dir)?;
        let record = store.experiment(id)?;
        assert_eq!(record.name, "persist");
        assert_eq!(record.status, RunStatus::Completed);
        assert_eq!(record.duration, Some(Duration::from_millis(1500)));
        let trace = store.trace(id)?;
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].board()?, board);
        assert_eq!(trace[1].live_cells, 2);

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn allocates_increasing_ids() -> Result<(), Error> {
        let dir = scratch_dir();
        let store = FileStore::open(&dir)?;
        let board = Board::new(1)?;
        let now = SystemTime::now();
        let a = store.create_experiment(&Config::default(), &board, now)?;
        let b = store.create_experiment(&Config::default(), &board, now)?;
        assert_eq!((a, b), (1, 2));
        let ids: Vec<_> = store.experiments()?.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(matches!(store.trace(3), Err(Error::ExperimentNotFound(3))));

        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
