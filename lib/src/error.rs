//! All kinds of errors in this crate.

use crate::{cells::Coord, record::ExperimentId};
use ca_rules::ParseRuleError;
use displaydoc::Display;
use std::io;
use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Board size should be positive.
    NonPositiveError,
    /// Initial density should be a number in [0, 1], got {0}.
    DensityError(f64),
    /// Invalid rule: {0:?}.
    ParseRuleError(#[from] ParseRuleError),
    /// Invalid neighbor count list: {0:?}.
    ParseCountError(String),
    /// Invalid board: {0}.
    ParseBoardError(String),
    /// A board of size {0} does not fit in memory.
    BoardTooLarge(usize),
    /// Board rows should all have length {0}.
    NonSquareError(usize),
    /// Cell at {0:?} is out of the board.
    SetCellError(Coord),
    /// Experiment {0} not found.
    ExperimentNotFound(ExperimentId),
    /// Experiment {0} has no recorded generations.
    EmptyTrace(ExperimentId),
    /// The worker of experiment {0} panicked.
    WorkerPanicked(ExperimentId),
    /// Invalid setting {0}: {1:?}.
    SettingError(&'static str, String),
    /// The store lock was poisoned by a panicking thread.
    PoisonError,
    /// I/O error: {0}.
    IoError(#[from] io::Error),
    /// JSON error: {0}.
    #[cfg(feature = "serde")]
    JsonError(#[from] serde_json::Error),
}
