//! Runs Life-like cellular automata on square boards with dead borders,
//! and records every generation.

mod analysis;
mod board;
mod cells;
mod config;
mod error;
mod record;
pub mod rules;
mod runner;
mod step;
mod store;

pub use analysis::{population_chart, Analysis, Frame, Summary};
pub use board::Board;
pub use cells::{Coord, State, ALIVE, DEAD};
pub use config::{Config, Settings};
pub use error::Error;
pub use record::{ExperimentId, ExperimentRecord, GenerationRecord, RunStatus, StatusReport};
pub use rules::RuleSet;
pub use runner::{RunHandle, Runner};
pub use step::{neighbor_count, step, Generation, Generations};
#[cfg(feature = "serde")]
pub use store::FileStore;
pub use store::{MemoryStore, Store};
