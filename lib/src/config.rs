//! Experiment and service configuration.

use crate::{board::Board, error::Error, rules::RuleSet};
use educe::Educe;
use rand::{rngs::StdRng, thread_rng, SeedableRng};
use std::{env, path::PathBuf, time::Duration};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Experiment configuration.
///
/// Supplied once when an experiment is launched; the rules apply to every
/// generation of the run.
#[derive(Clone, Debug, Educe, PartialEq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// A descriptive name.
    #[educe(Default = "Game of Life (B3/S23)")]
    pub name: String,

    /// Side length of the square board.
    #[educe(Default = 20)]
    pub board_size: usize,

    /// Number of generations to record.
    #[educe(Default = 50)]
    pub num_steps: u64,

    /// Probability that a cell of the initial board is alive.
    #[educe(Default = 0.5)]
    pub initial_density: f64,

    /// Neighbor counts at which a living cell survives.
    #[educe(Default(expression = "vec![2, 3]"))]
    pub survival_rules: Vec<u32>,

    /// Neighbor counts at which a dead cell is born.
    #[educe(Default(expression = "vec![3]"))]
    pub birth_rules: Vec<u32>,

    /// The rule in `B.../S...` notation.
    ///
    /// Only used for display; the stepping uses
    /// [`survival_rules`](#structfield.survival_rules) and
    /// [`birth_rules`](#structfield.birth_rules).
    #[educe(Default = "B3/S23")]
    pub rules_notation: String,

    /// Seed of the random initial board.
    ///
    /// `None` means that a fresh random board is used for every run.
    pub seed: Option<u64>,
}

impl Config {
    /// Sets up a new configuration with given board size and number of steps.
    pub fn new(board_size: usize, num_steps: u64) -> Self {
        Config {
            board_size,
            num_steps,
            ..Config::default()
        }
    }

    /// Sets the name.
    pub fn set_name<S: ToString>(mut self, name: S) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the initial density.
    pub fn set_initial_density(mut self, initial_density: f64) -> Self {
        self.initial_density = initial_density;
        self
    }

    /// Sets the survival and birth rules, and the matching notation.
    pub fn set_rules(mut self, rules: &RuleSet) -> Self {
        self.survival_rules = rules.survival().iter().copied().collect();
        self.birth_rules = rules.birth().iter().copied().collect();
        self.rules_notation = rules.notation();
        self
    }

    /// Sets the notation string without touching the rules.
    pub fn set_rules_notation<S: ToString>(mut self, rules_notation: S) -> Self {
        self.rules_notation = rules_notation.to_string();
        self
    }

    /// Sets the seed of the initial board.
    pub fn set_seed<T: Into<Option<u64>>>(mut self, seed: T) -> Self {
        self.seed = seed.into();
        self
    }

    /// The rule set of the run.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.survival_rules.iter().copied(),
            self.birth_rules.iter().copied(),
        )
    }

    /// Generates a random initial board.
    ///
    /// The board is reproducible if a seed is set.
    pub fn random_board(&self) -> Result<Board, Error> {
        match self.seed {
            Some(seed) => Board::random(
                self.board_size,
                self.initial_density,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => Board::random(self.board_size, self.initial_density, &mut thread_rng()),
        }
    }

    /// Checks the configuration before a run is launched.
    pub fn validate(&self) -> Result<(), Error> {
        Board::cell_count(self.board_size)?;
        if !(0.0..=1.0).contains(&self.initial_density) {
            return Err(Error::DensityError(self.initial_density));
        }
        Ok(())
    }
}

/// Service settings.
///
/// Resolved once at startup and handed to the [`Runner`](crate::Runner);
/// nothing reads the environment after that.
#[derive(Clone, Debug, Educe, PartialEq, Eq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Root directory of the on-disk trace store.
    #[educe(Default(expression = "PathBuf::from(\"traces\")"))]
    pub data_dir: PathBuf,

    /// Pause between two steps of a run, in milliseconds.
    #[educe(Default = 500)]
    pub step_delay_ms: u64,

    /// Pause between two status queries of the front end, in milliseconds.
    #[educe(Default = 1000)]
    pub poll_interval_ms: u64,
}

impl Settings {
    /// Environment variable for [`data_dir`](#structfield.data_dir).
    pub const DATA_DIR_VAR: &'static str = "LIFETRACE_DATA_DIR";
    /// Environment variable for [`step_delay_ms`](#structfield.step_delay_ms).
    pub const STEP_DELAY_VAR: &'static str = "LIFETRACE_STEP_DELAY_MS";
    /// Environment variable for [`poll_interval_ms`](#structfield.poll_interval_ms).
    pub const POLL_INTERVAL_VAR: &'static str = "LIFETRACE_POLL_INTERVAL_MS";

    /// Default settings, overridden by the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Settings::default().override_with(|key| env::var(key).ok())
    }

    /// Overrides the settings with the variables that `var` knows about.
    pub fn override_with<F>(mut self, var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var(Self::DATA_DIR_VAR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ms) = var(Self::STEP_DELAY_VAR) {
            self.step_delay_ms = ms
                .trim()
                .parse()
                .map_err(|_| Error::SettingError(Self::STEP_DELAY_VAR, ms))?;
        }
        if let Some(ms) = var(Self::POLL_INTERVAL_VAR) {
            self.poll_interval_ms = ms
                .trim()
                .parse()
                .map_err(|_| Error::SettingError(Self::POLL_INTERVAL_VAR, ms))?;
        }
        Ok(self)
    }

    /// Sets the data directory.
    pub fn set_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Sets the pause between two steps.
    pub fn set_step_delay_ms(mut self, step_delay_ms: u64) -> Self {
        self.step_delay_ms = step_delay_ms;
        self
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
