//! Records of experiments and their generations.

use crate::{board::Board, error::Error};
use std::{
    fmt::{self, Display, Formatter},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of an experiment in a [`Store`](crate::Store).
pub type ExperimentId = u64;

/// Status of an experiment.
///
/// An experiment starts as `Pending`, becomes `Running` once its worker
/// starts stepping, and ends as either `Completed` or `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RunStatus {
    /// Recorded, but no generation has been stepped yet.
    Pending,
    /// Still stepping.
    Running,
    /// All configured generations were recorded.
    Completed,
    /// Stepping or recording failed. Generations recorded before the
    /// failure are still valid.
    Failed,
}

impl RunStatus {
    /// Whether no further generation will ever be recorded.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Everything stored about one experiment, apart from its trace.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExperimentRecord {
    pub id: ExperimentId,
    pub name: String,
    pub board_size: usize,
    pub num_steps: u64,
    /// The initial board, in list-of-lists form.
    pub initial_config: String,
    pub rules_notation: String,
    pub survival_rules: Vec<u32>,
    pub birth_rules: Vec<u32>,
    pub status: RunStatus,
    pub start_time: SystemTime,
    pub end_time: Option<SystemTime>,
    /// `end_time - start_time`, set on completion.
    pub duration: Option<Duration>,
}

/// One generation of an experiment, as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationRecord {
    pub experiment_id: ExperimentId,
    pub generation: u64,
    pub capture_time: SystemTime,
    /// The board, in list-of-lists form.
    pub board_state: String,
    pub live_cells: usize,
}

impl GenerationRecord {
    /// Captures a board now.
    pub fn capture(experiment_id: ExperimentId, generation: u64, board: &Board) -> Self {
        GenerationRecord {
            experiment_id,
            generation,
            capture_time: SystemTime::now(),
            board_state: board.to_list_string(),
            live_cells: board.population(),
        }
    }

    /// Decodes the stored board.
    pub fn board(&self) -> Result<Board, Error> {
        self.board_state.parse()
    }
}

/// The answer to a status query.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusReport {
    pub experiment_id: ExperimentId,
    pub status: RunStatus,
    pub total_steps: u64,
    /// Seconds, rounded to two decimals.
    pub duration_seconds: Option<f64>,
    /// Seconds since the Unix epoch.
    pub start_time: Option<f64>,
    /// Seconds since the Unix epoch.
    pub end_time: Option<f64>,
}

fn epoch_seconds(time: SystemTime) -> Option<f64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs_f64())
}

impl From<&ExperimentRecord> for StatusReport {
    fn from(record: &ExperimentRecord) -> Self {
        StatusReport {
            experiment_id: record.id,
            status: record.status,
            total_steps: record.num_steps,
            duration_seconds: record
                .duration
                .map(|d| (d.as_secs_f64() * 100.0).round() / 100.0),
            start_time: epoch_seconds(record.start_time),
            end_time: record.end_time.and_then(epoch_seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::ALIVE;

    #[test]
    fn status_display() {
        assert_eq!(RunStatus::Completed.to_string(), "COMPLETED");
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(!RunStatus::Pending.is_terminal());
    }

    #[test]
    fn capture_and_decode() -> Result<(), Error> {
        let mut board = Board::new(3)?;
        board.set((0, 2), ALIVE)?;
        board.set((2, 0), ALIVE)?;
        let record = GenerationRecord::capture(7, 4, &board);
        assert_eq!(record.live_cells, 2);
        assert_eq!(record.generation, 4);
        assert_eq!(record.board()?, board);
        Ok(())
    }

    #[test]
    fn report_rounds_duration() {
        let start = UNIX_EPOCH + Duration::from_secs(1_000);
        let record = ExperimentRecord {
            id: 3,
            name: String::from("test"),
            board_size: 4,
            num_steps: 10,
            initial_config: String::new(),
            rules_notation: String::from("B3/S23"),
            survival_rules: vec![2, 3],
            birth_rules: vec![3],
            status: RunStatus::Completed,
            start_time: start,
            end_time: Some(start + Duration::from_millis(5_126)),
            duration: Some(Duration::from_millis(5_126)),
        };
        let report = StatusReport::from(&record);
        assert_eq!(report.duration_seconds, Some(5.13));
        assert_eq!(report.start_time, Some(1_000.0));
        assert_eq!(report.total_steps, 10);
    }
}
