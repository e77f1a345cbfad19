//! Running experiments in the background.

use crate::{
    board::Board,
    config::{Config, Settings},
    error::Error,
    record::{ExperimentId, GenerationRecord, RunStatus, StatusReport},
    rules::RuleSet,
    step::Generations,
    store::Store,
};
use log::{debug, error, info};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, SystemTime},
};

/// Launches experiments and answers status queries.
///
/// Every experiment runs on its own worker thread, which owns its board.
/// The worker reports its terminal status only through the store.
pub struct Runner<S: ?Sized> {
    store: Arc<S>,
    settings: Settings,
}

impl<S: Store + ?Sized + 'static> Runner<S> {
    pub fn new(store: Arc<S>, settings: Settings) -> Self {
        Runner { store, settings }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Records a new experiment and starts stepping it in the background.
    ///
    /// Returns as soon as the experiment is recorded. The configuration is
    /// checked first; an invalid configuration never reaches the store.
    pub fn launch(&self, config: &Config) -> Result<RunHandle, Error> {
        config.validate()?;
        let initial = config.random_board()?;
        let id = self
            .store
            .create_experiment(config, &initial, SystemTime::now())?;
        info!(
            "Experiment {} launched: {:?}, {}x{}, {} steps, rule {}",
            id,
            config.name,
            config.board_size,
            config.board_size,
            config.num_steps,
            config.rules_notation
        );

        let job = Job {
            store: Arc::clone(&self.store),
            id,
            initial,
            rules: config.rule_set(),
            num_steps: config.num_steps,
            step_delay: self.settings.step_delay(),
        };
        let spawned = thread::Builder::new()
            .name(format!("experiment-{}", id))
            .spawn(move || job.run());
        match spawned {
            Ok(handle) => Ok(RunHandle { id, handle }),
            Err(e) => {
                error!("Experiment {} could not start: {}", id, e);
                self.store.set_status(id, RunStatus::Failed)?;
                Err(e.into())
            }
        }
    }

    /// Launches an experiment and waits for it to finish.
    pub fn run(&self, config: &Config) -> Result<(ExperimentId, RunStatus), Error> {
        let handle = self.launch(config)?;
        let id = handle.id();
        Ok((id, handle.join()?))
    }

    /// The current status of an experiment.
    pub fn status(&self, id: ExperimentId) -> Result<StatusReport, Error> {
        Ok(StatusReport::from(&self.store.experiment(id)?))
    }
}

/// A launched experiment.
///
/// Dropping the handle detaches the worker; it keeps running.
#[derive(Debug)]
pub struct RunHandle {
    id: ExperimentId,
    handle: JoinHandle<RunStatus>,
}

impl RunHandle {
    pub fn id(&self) -> ExperimentId {
        self.id
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker and returns the terminal status.
    pub fn join(self) -> Result<RunStatus, Error> {
        self.handle
            .join()
            .map_err(|_| Error::WorkerPanicked(self.id))
    }
}

/// Everything a worker needs.
struct Job<S: ?Sized> {
    store: Arc<S>,
    id: ExperimentId,
    initial: Board,
    rules: RuleSet,
    num_steps: u64,
    step_delay: Duration,
}

impl<S: Store + ?Sized> Job<S> {
    /// Steps the board and records the outcome.
    ///
    /// A panic while stepping or recording fails the run like an error does.
    fn run(self) -> RunStatus {
        let Job {
            store,
            id,
            initial,
            rules,
            num_steps,
            step_delay,
        } = self;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            simulate(&*store, id, initial, &rules, num_steps, step_delay)
        }));
        match outcome {
            Ok(Ok(())) => {
                info!("Experiment {} completed", id);
                return RunStatus::Completed;
            }
            Ok(Err(e)) => error!("Experiment {} failed: {}", id, e),
            Err(payload) => error!(
                "Experiment {} panicked: {}",
                id,
                panic_message(payload.as_ref())
            ),
        }
        if let Err(e) = store.set_status(id, RunStatus::Failed) {
            error!("Experiment {} could not be marked as failed: {}", id, e);
        }
        RunStatus::Failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown cause"
    }
}

/// Steps a board `num_steps` times, recording every generation.
///
/// Stops at the first error; generations recorded before it stay valid.
fn simulate<S: Store + ?Sized>(
    store: &S,
    id: ExperimentId,
    initial: Board,
    rules: &RuleSet,
    num_steps: u64,
    step_delay: Duration,
) -> Result<(), Error> {
    store.set_status(id, RunStatus::Running)?;
    for generation in Generations::new(initial, rules, num_steps) {
        if generation.number > 0 && !step_delay.is_zero() {
            thread::sleep(step_delay);
        }
        let record = GenerationRecord::capture(id, generation.number, &generation.board);
        debug!(
            "Experiment {} generation {}: {} living cells",
            id, record.generation, record.live_cells
        );
        store.append_generation(&record)?;
    }
    store.complete(id, SystemTime::now())
}
