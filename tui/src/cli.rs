//! Carrying out the parsed command.

use crate::args::{Action, Args};
use lifetrace_lib::{
    population_chart, Analysis, Board, Config, ExperimentId, FileStore, Generations, RunHandle,
    Runner, Settings, Store,
};
use log::debug;
use std::{error::Error, sync::Arc, thread};

pub(crate) type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn runner(settings: &Settings) -> Result<Runner<FileStore>> {
    debug!("Opening the trace store at {}", settings.data_dir.display());
    let store = FileStore::open(&settings.data_dir)?;
    Ok(Runner::new(Arc::new(store), settings.clone()))
}

pub(crate) fn run(args: Args) -> Result<()> {
    let Args { settings, action } = args;
    match action {
        #[cfg(feature = "tui")]
        Action::Run {
            config,
            quiet,
            no_tui,
        } => {
            let runner = runner(&settings)?;
            let handle = runner.launch(&config)?;
            if quiet {
                wait_quietly(&runner, handle)
            } else if no_tui {
                follow(&runner, handle)
            } else {
                crate::tui::follow_with_tui(&runner, handle)
            }
        }
        #[cfg(not(feature = "tui"))]
        Action::Run { config, quiet } => {
            let runner = runner(&settings)?;
            let handle = runner.launch(&config)?;
            if quiet {
                wait_quietly(&runner, handle)
            } else {
                follow(&runner, handle)
            }
        }
        Action::Status(id) => status(&settings, id),
        Action::List => list(&settings),
        Action::Analyze {
            id,
            frames,
            width,
            height,
        } => analyze(&settings, id, frames, width, height),
        Action::Simulate { config, initial } => simulate(&config, initial),
    }
}

pub(crate) fn print_report(runner: &Runner<FileStore>, id: ExperimentId) -> Result<()> {
    let report = runner.status(id)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Waits for the worker without printing progress.
fn wait_quietly(runner: &Runner<FileStore>, handle: RunHandle) -> Result<()> {
    let id = handle.id();
    println!("{}", id);
    handle.join()?;
    print_report(runner, id)
}

/// Polls the status of a run until it finishes, printing progress.
fn follow(runner: &Runner<FileStore>, handle: RunHandle) -> Result<()> {
    let id = handle.id();
    println!("Launched experiment {}", id);
    loop {
        let report = runner.status(id)?;
        let recorded = runner.store().trace(id)?.len();
        println!(
            "Experiment {}: {}, {}/{} generations recorded",
            id, report.status, recorded, report.total_steps
        );
        if report.status.is_terminal() {
            break;
        }
        thread::sleep(runner.settings().poll_interval());
    }
    handle.join()?;
    print_report(runner, id)
}

fn status(settings: &Settings, id: ExperimentId) -> Result<()> {
    print_report(&runner(settings)?, id)
}

fn list(settings: &Settings) -> Result<()> {
    let store = FileStore::open(&settings.data_dir)?;
    let experiments = store.experiments()?;
    if experiments.is_empty() {
        println!("No experiments in {}", settings.data_dir.display());
        return Ok(());
    }
    println!(
        "{:>4}  {:<9}  {:>7}  {:>6}  {:<12}  NAME",
        "ID", "STATUS", "SIZE", "STEPS", "RULE"
    );
    for e in experiments {
        println!(
            "{:>4}  {:<9}  {:>7}  {:>6}  {:<12}  {}",
            e.id,
            e.status.to_string(),
            format!("{}x{}", e.board_size, e.board_size),
            e.num_steps,
            e.rules_notation,
            e.name
        );
    }
    Ok(())
}

fn analyze(
    settings: &Settings,
    id: ExperimentId,
    frames: bool,
    width: usize,
    height: usize,
) -> Result<()> {
    let store = FileStore::open(&settings.data_dir)?;
    let analysis = Analysis::load(&store, id)?;
    println!("{}", analysis.report());
    println!("Living cells by generation:");
    print!("{}", population_chart(&analysis.population(), width, height));
    if frames {
        for frame in analysis.frames() {
            println!();
            println!(
                "Generation {} ({} living cells):",
                frame.generation, frame.live_cells
            );
            print!("{}", frame.board);
        }
    }
    Ok(())
}

/// Steps a board and prints every generation.
fn simulate(config: &Config, initial: Option<Board>) -> Result<()> {
    let initial = match initial {
        Some(board) => board,
        None => {
            config.validate()?;
            config.random_board()?
        }
    };
    let rules = config.rule_set();
    println!("Rule: {}", rules);
    for generation in Generations::new(initial, &rules, config.num_steps) {
        println!();
        println!(
            "Generation {} ({} living cells):",
            generation.number,
            generation.live_cells()
        );
        print!("{}", generation.board);
    }
    Ok(())
}
