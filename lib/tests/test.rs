use lifetrace_lib::{
    step, Board, Config, Error, ExperimentId, ExperimentRecord, GenerationRecord, MemoryStore,
    RuleSet, RunStatus, Runner, Settings, Store,
};
use std::{io, sync::Arc, time::SystemTime};

fn board(picture: &str) -> Result<Board, Error> {
    Board::from_plaintext(picture)
}

#[test]
fn block_is_still() -> Result<(), Error> {
    let block = board(
        "....\n\
         .oo.\n\
         .oo.\n\
         ....",
    )?;
    assert_eq!(step(&block, &RuleSet::conway()), block);
    Ok(())
}

#[test]
fn block_in_corner_is_still() -> Result<(), Error> {
    let block = board("oo\noo")?;
    assert_eq!(step(&block, &RuleSet::conway()), block);
    Ok(())
}

#[test]
fn lone_cell_dies() -> Result<(), Error> {
    let lone = board("...\n.o.\n...")?;
    assert_eq!(step(&lone, &RuleSet::conway()).population(), 0);
    assert_eq!(step(&board("o")?, &RuleSet::conway()).population(), 0);
    Ok(())
}

#[test]
fn glider_settles_into_a_block() -> Result<(), Error> {
    let glider = board(".o.\n..o\nooo")?;
    let rules = RuleSet::conway();
    let next = step(&glider, &rules);
    assert_eq!(next, board("...\no.o\n.oo")?);
    let block = board("...\n.oo\n.oo")?;
    assert_eq!(step(&step(&next, &rules), &rules), block);
    assert_eq!(step(&block, &rules), block);
    Ok(())
}

#[test]
fn empty_rules_kill_everything() -> Result<(), Error> {
    let full = Board::from_rows(vec![[1u8; 4]; 4])?;
    let rules = RuleSet::new([], []);
    assert_eq!(step(&full, &rules).population(), 0);
    Ok(())
}

#[test]
fn other_rules() -> Result<(), Error> {
    let pair = board("....\n.oo.\n....\n....")?;
    // Seeds: both cells die, and the cells touching both are born.
    let next = step(&pair, &RuleSet::seeds());
    assert_eq!(next, board(".oo.\n....\n.oo.\n....")?);

    let lone = board("...\n.o.\n...")?;
    assert_eq!(step(&lone, &RuleSet::life_without_death()), lone);
    assert_eq!("B36/S23".parse::<RuleSet>()?, RuleSet::highlife());
    Ok(())
}

/// A store that refuses every generation from `fail_from` on, either with
/// an error or, if `panics` is set, by panicking.
struct FailingStore {
    inner: MemoryStore,
    fail_from: u64,
    panics: bool,
}

impl Store for FailingStore {
    fn create_experiment(
        &self,
        config: &Config,
        initial: &Board,
        start_time: SystemTime,
    ) -> Result<ExperimentId, Error> {
        self.inner.create_experiment(config, initial, start_time)
    }

    fn set_status(&self, id: ExperimentId, status: RunStatus) -> Result<(), Error> {
        self.inner.set_status(id, status)
    }

    fn complete(&self, id: ExperimentId, end_time: SystemTime) -> Result<(), Error> {
        self.inner.complete(id, end_time)
    }

    fn append_generation(&self, record: &GenerationRecord) -> Result<(), Error> {
        if record.generation >= self.fail_from {
            if self.panics {
                panic!("generation {} lost", record.generation);
            }
            return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
        }
        self.inner.append_generation(record)
    }

    fn experiment(&self, id: ExperimentId) -> Result<ExperimentRecord, Error> {
        self.inner.experiment(id)
    }

    fn trace(&self, id: ExperimentId) -> Result<Vec<GenerationRecord>, Error> {
        self.inner.trace(id)
    }

    fn experiments(&self) -> Result<Vec<ExperimentRecord>, Error> {
        self.inner.experiments()
    }
}

#[test]
fn failed_run_keeps_earlier_generations() -> Result<(), Error> {
    let store = Arc::new(FailingStore {
        inner: MemoryStore::new(),
        fail_from: 2,
        panics: false,
    });
    let runner = Runner::new(store, Settings::default().set_step_delay_ms(0));
    let (id, status) = runner.run(&Config::new(6, 10).set_seed(3))?;
    assert_eq!(status, RunStatus::Failed);

    let report = runner.status(id)?;
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.duration_seconds, None);
    let trace = runner.store().trace(id)?;
    assert_eq!(trace.len(), 2);
    Ok(())
}

#[test]
fn panicking_run_is_marked_failed() -> Result<(), Error> {
    let store = Arc::new(FailingStore {
        inner: MemoryStore::new(),
        fail_from: 1,
        panics: true,
    });
    let runner = Runner::new(store, Settings::default().set_step_delay_ms(0));
    let handle = runner.launch(&Config::new(5, 4).set_seed(8))?;
    let id = handle.id();
    assert_eq!(handle.join()?, RunStatus::Failed);

    let report = runner.status(id)?;
    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.status.is_terminal());
    assert_eq!(runner.store().trace(id)?.len(), 1);
    Ok(())
}

#[test]
fn run_follows_the_rules() -> Result<(), Error> {
    let runner = Runner::new(
        Arc::new(MemoryStore::new()),
        Settings::default().set_step_delay_ms(0),
    );
    let config = Config::new(12, 6)
        .set_rules(&RuleSet::highlife())
        .set_initial_density(0.3)
        .set_seed(11);
    let (id, status) = runner.run(&config)?;
    assert_eq!(status, RunStatus::Completed);

    let record = runner.store().experiment(id)?;
    assert_eq!(record.rules_notation, "B36/S23");
    assert_eq!(record.survival_rules, vec![2, 3]);
    assert_eq!(record.birth_rules, vec![3, 6]);

    let trace = runner.store().trace(id)?;
    assert_eq!(trace.len(), 6);
    for pair in trace.windows(2) {
        assert_eq!(step(&pair[0].board()?, &RuleSet::highlife()), pair[1].board()?);
    }
    Ok(())
}

#[test]
fn concurrent_runs() -> Result<(), Error> {
    let runner = Runner::new(
        Arc::new(MemoryStore::new()),
        Settings::default().set_step_delay_ms(1),
    );
    let handles = (0..4u64)
        .map(|i| runner.launch(&Config::new(8, 5).set_seed(i)))
        .collect::<Result<Vec<_>, _>>()?;
    for handle in handles {
        let id = handle.id();
        assert_eq!(handle.join()?, RunStatus::Completed);
        assert_eq!(runner.store().trace(id)?.len(), 5);
    }
    let ids: Vec<_> = runner
        .store()
        .experiments()?
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    Ok(())
}
