//! Inspecting recorded experiments.

use crate::{
    board::Board,
    error::Error,
    record::{ExperimentId, ExperimentRecord, GenerationRecord},
    store::Store,
};
use log::warn;
use std::fmt::{self, Display, Formatter};

/// Descriptive statistics of a series of numbers.
///
/// Quantiles use linear interpolation between the closest ranks, and the
/// standard deviation is the sample one (divided by `n - 1`). Statistics
/// that are undefined for too few values are `NaN`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Summary {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            f64::NAN
        };
        Summary {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}

/// `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rows = [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ];
        for (name, value) in rows.iter() {
            writeln!(f, "{:<6}{:>14.6}", name, value)?;
        }
        Ok(())
    }
}

/// A decoded generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub generation: u64,
    pub live_cells: usize,
    pub board: Board,
}

/// An experiment together with its trace.
#[derive(Clone, Debug)]
pub struct Analysis {
    experiment: ExperimentRecord,
    trace: Vec<GenerationRecord>,
}

impl Analysis {
    /// Loads an experiment and its trace.
    ///
    /// Fails with [`Error::EmptyTrace`] if nothing has been recorded yet.
    pub fn load<S: Store + ?Sized>(store: &S, id: ExperimentId) -> Result<Self, Error> {
        let experiment = store.experiment(id)?;
        let trace = store.trace(id)?;
        if trace.is_empty() {
            return Err(Error::EmptyTrace(id));
        }
        Ok(Analysis { experiment, trace })
    }

    pub fn experiment(&self) -> &ExperimentRecord {
        &self.experiment
    }

    pub fn trace(&self) -> &[GenerationRecord] {
        &self.trace
    }

    /// `(generation, living cells)` for every recorded generation.
    pub fn population(&self) -> Vec<(u64, usize)> {
        self.trace
            .iter()
            .map(|r| (r.generation, r.live_cells))
            .collect()
    }

    /// Statistics of the number of living cells.
    pub fn summary(&self) -> Summary {
        let values: Vec<f64> = self.trace.iter().map(|r| r.live_cells as f64).collect();
        Summary::of(&values)
    }

    /// Decodes the board of every generation.
    ///
    /// Generations whose board cannot be decoded are logged and skipped.
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames = Vec::with_capacity(self.trace.len());
        for record in &self.trace {
            match record.board() {
                Ok(board) => {
                    if board.population() != record.live_cells {
                        warn!(
                            "Generation {} of experiment {} records {} living cells, but its board has {}",
                            record.generation,
                            record.experiment_id,
                            record.live_cells,
                            board.population()
                        );
                    }
                    frames.push(Frame {
                        generation: record.generation,
                        live_cells: record.live_cells,
                        board,
                    });
                }
                Err(e) => warn!(
                    "Skipping generation {} of experiment {}: {}",
                    record.generation, record.experiment_id, e
                ),
            }
        }
        frames
    }

    /// A plain-text description of the experiment and its statistics.
    pub fn report(&self) -> String {
        let e = &self.experiment;
        let join = |counts: &[u32]| {
            counts
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let duration = match e.duration {
            Some(d) => format!("{:.2} seconds", d.as_secs_f64()),
            None => String::from("unknown"),
        };
        format!(
            "Experiment: {} (#{})\n\
             Status: {}\n\
             Rules: {} (S: {}, B: {})\n\
             Board size: {}x{}\n\
             Generations recorded: {}\n\
             Duration: {}\n\
             \n\
             Living cells:\n\
             {}",
            e.name,
            e.id,
            e.status,
            e.rules_notation,
            join(&e.survival_rules),
            join(&e.birth_rules),
            e.board_size,
            e.board_size,
            self.trace.len(),
            duration,
            self.summary()
        )
    }
}

/// Plots a population series as text.
///
/// The plot is `width` columns by `height` rows, with the largest
/// population on the top row and zero on the bottom one.
pub fn population_chart(series: &[(u64, usize)], width: usize, height: usize) -> String {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => return String::new(),
    };
    let width = width.max(2);
    let height = height.max(2);
    let max = series.iter().map(|&(_, p)| p).max().unwrap_or(0);

    let mut grid = vec![vec![' '; width]; height];
    let n = series.len() - 1;
    for (i, &(_, population)) in series.iter().enumerate() {
        let col = if n == 0 { 0 } else { i * (width - 1) / n };
        let level = if max == 0 {
            0
        } else {
            (population * (height - 1) + max / 2) / max
        };
        grid[height - 1 - level][col] = '*';
    }

    let label_width = max.to_string().len();
    let mut lines = Vec::with_capacity(height + 2);
    for (r, row) in grid.iter().enumerate() {
        let label = if r == 0 {
            max.to_string()
        } else if r == height - 1 {
            String::from("0")
        } else {
            String::new()
        };
        let row: String = row.iter().collect();
        lines.push(format!("{:>w$} |{}", label, row.trim_end(), w = label_width));
    }
    lines.push(format!("{:>w$} +{}", "", "-".repeat(width), w = label_width));
    let first = first.to_string();
    lines.push(format!(
        "{:>w$}  {}{:>pad$}",
        "",
        first,
        last,
        w = label_width,
        pad = width.saturating_sub(first.len())
    ));
    lines.join("\n") + "\n"
}
