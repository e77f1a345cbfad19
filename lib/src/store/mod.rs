//! Where experiments and their traces are kept.

use crate::{
    board::Board,
    config::Config,
    error::Error,
    record::{ExperimentId, ExperimentRecord, GenerationRecord, RunStatus},
};
use std::time::SystemTime;

#[cfg(feature = "serde")]
mod file;
mod memory;

#[cfg(feature = "serde")]
pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage of experiments and their traces.
///
/// Implementations are shared between the runner's workers and the readers
/// of the results, so every method takes `&self`.
pub trait Store: Send + Sync {
    /// Records a new experiment with status [`RunStatus::Pending`].
    fn create_experiment(
        &self,
        config: &Config,
        initial: &Board,
        start_time: SystemTime,
    ) -> Result<ExperimentId, Error>;

    /// Changes the status of an experiment.
    fn set_status(&self, id: ExperimentId, status: RunStatus) -> Result<(), Error>;

    /// Marks an experiment as [`RunStatus::Completed`] and records its
    /// end time and duration.
    fn complete(&self, id: ExperimentId, end_time: SystemTime) -> Result<(), Error>;

    /// Appends a generation to the trace of its experiment.
    fn append_generation(&self, record: &GenerationRecord) -> Result<(), Error>;

    /// Gets an experiment.
    fn experiment(&self, id: ExperimentId) -> Result<ExperimentRecord, Error>;

    /// Gets the trace of an experiment, ordered by generation.
    fn trace(&self, id: ExperimentId) -> Result<Vec<GenerationRecord>, Error>;

    /// Gets all experiments, ordered by id.
    fn experiments(&self) -> Result<Vec<ExperimentRecord>, Error>;
}

/// Builds the record of a newly created experiment.
fn new_record(
    id: ExperimentId,
    config: &Config,
    initial: &Board,
    start_time: SystemTime,
) -> ExperimentRecord {
    ExperimentRecord {
        id,
        name: config.name.clone(),
        board_size: config.board_size,
        num_steps: config.num_steps,
        initial_config: initial.to_list_string(),
        rules_notation: config.rules_notation.clone(),
        survival_rules: config.survival_rules.clone(),
        birth_rules: config.birth_rules.clone(),
        status: RunStatus::Pending,
        start_time,
        end_time: None,
        duration: None,
    }
}

/// Marks a record as completed at `end_time`.
fn finish_record(record: &mut ExperimentRecord, end_time: SystemTime) {
    record.status = RunStatus::Completed;
    record.end_time = Some(end_time);
    record.duration = Some(
        end_time
            .duration_since(record.start_time)
            .unwrap_or_default(),
    );
}
