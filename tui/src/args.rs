//! Parsing command-line arguments.

use clap::{
    crate_description, crate_name, crate_version, error::ErrorKind, value_parser, Arg, ArgAction,
    ArgMatches, Command, Error,
};
use lifetrace_lib::{Board, Config, ExperimentId, RuleSet, Settings};
use std::{
    collections::BTreeSet,
    env,
    error::Error as StdError,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) | Err(_) => Err(String::from("must be a positive integer")),
        Ok(n) => Ok(n),
    }
}

fn parse_density(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(d) if (0.0..=1.0).contains(&d) => Ok(d),
        _ => Err(String::from("must be a number between 0 and 1")),
    }
}

fn parse_rule(s: &str) -> Result<RuleSet, String> {
    s.parse::<RuleSet>().map_err(|e| e.to_string())
}

fn parse_counts(s: &str) -> Result<BTreeSet<u32>, String> {
    RuleSet::parse_counts(s).map_err(|e| e.to_string())
}

/// What to do.
pub(crate) enum Action {
    /// Launches an experiment and follows it.
    Run {
        config: Config,
        quiet: bool,
        #[cfg(feature = "tui")]
        no_tui: bool,
    },
    /// Prints the status of an experiment.
    Status(ExperimentId),
    /// Lists stored experiments.
    List,
    /// Prints the report of an experiment.
    Analyze {
        id: ExperimentId,
        frames: bool,
        width: usize,
        height: usize,
    },
    /// Steps a board without storing anything.
    Simulate {
        config: Config,
        initial: Option<Board>,
    },
}

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) settings: Settings,
    pub(crate) action: Action,
}

/// Arguments describing an experiment, shared by `run` and `simulate`.
fn experiment_args() -> Vec<Arg> {
    vec![
        Arg::new("SIZE")
            .help("Side length of the square board [default: 20]")
            .short('s')
            .long("size")
            .value_parser(parse_positive),
        Arg::new("STEPS")
            .help("Number of generations to record [default: 50]")
            .short('n')
            .long("steps")
            .value_parser(value_parser!(u64)),
        Arg::new("DENSITY")
            .help("Probability that a cell of the initial board is alive [default: 0.5]")
            .short('d')
            .long("density")
            .value_parser(parse_density),
        Arg::new("RULE")
            .help("Rule of the cellular automaton, e.g. B36/S23 [default: B3/S23]")
            .long_help(
                "Rule of the cellular automaton, e.g. B36/S23 [default: B3/S23]\n\
                 Supports Life-like rules in B/S notation.\n\
                 See [https://conwaylife.com/wiki/Rulestring]",
            )
            .short('r')
            .long("rule")
            .value_parser(parse_rule)
            .conflicts_with_all(["SURVIVAL", "BIRTH"]),
        Arg::new("SURVIVAL")
            .help("Neighbor counts at which a living cell survives, e.g. \"2,3\"")
            .long_help(
                "Neighbor counts at which a living cell survives, e.g. \"2,3\"\n\
                 Counts are separated by commas or spaces, and may be empty.\n",
            )
            .long("survival")
            .value_parser(parse_counts),
        Arg::new("BIRTH")
            .help("Neighbor counts at which a dead cell is born, e.g. \"3\"")
            .long_help(
                "Neighbor counts at which a dead cell is born, e.g. \"3\"\n\
                 Counts are separated by commas or spaces, and may be empty.\n",
            )
            .long("birth")
            .value_parser(parse_counts),
        Arg::new("SEED")
            .help("Seed of the random initial board")
            .long("seed")
            .value_parser(value_parser!(u64)),
    ]
}

fn app() -> Command {
    #[cfg_attr(not(feature = "tui"), allow(unused_mut))]
    let mut run = Command::new("run")
        .about("Launches an experiment and follows it until it finishes")
        .args(experiment_args())
        .arg(
            Arg::new("NAME")
                .help("A descriptive name for the experiment")
                .long("name"),
        )
        .arg(
            Arg::new("QUIET")
                .help("Prints only the experiment id and its final status")
                .long("quiet")
                .action(ArgAction::SetTrue),
        );

    #[cfg(feature = "tui")]
    {
        run = run.arg(
            Arg::new("NOTUI")
                .help("Prints plain progress lines instead of the live view")
                .long("no-tui")
                .action(ArgAction::SetTrue)
                .conflicts_with("QUIET"),
        );
    }

    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("DATA_DIR")
                .help("Root directory of the trace store")
                .long_help(
                    "Root directory of the trace store\n\
                     Overrides the settings file and LIFETRACE_DATA_DIR.\n",
                )
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("SETTINGS")
                .help("Settings file in TOML, YAML or JSON format")
                .long_help(
                    "Settings file in TOML, YAML or JSON format\n\
                     The format is chosen by the file extension. \
                     Environment variables override the file.\n",
                )
                .long("settings")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(run)
        .subcommand(
            Command::new("status")
                .about("Prints the status of an experiment as JSON")
                .arg(
                    Arg::new("ID")
                        .help("Experiment id")
                        .required(true)
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(Command::new("list").about("Lists the stored experiments"))
        .subcommand(
            Command::new("analyze")
                .about("Prints statistics and a population chart of an experiment")
                .arg(
                    Arg::new("ID")
                        .help("Experiment id")
                        .required(true)
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("FRAMES")
                        .help("Also prints the board of every generation")
                        .long("frames")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("WIDTH")
                        .help("Width of the population chart")
                        .long("width")
                        .default_value("60")
                        .value_parser(parse_positive),
                )
                .arg(
                    Arg::new("HEIGHT")
                        .help("Height of the population chart")
                        .long("height")
                        .default_value("12")
                        .value_parser(parse_positive),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Steps a board and prints every generation, without storing anything")
                .args(experiment_args())
                .arg(
                    Arg::new("INPUT")
                        .help("Starts from a board in Plaintext format instead of a random one")
                        .long_help(
                            "Starts from a board in Plaintext format instead of a random one\n\
                             `.` is a dead cell and `o` a living one. \
                             The board must be square; --size and --density are ignored.\n",
                        )
                        .short('i')
                        .long("input")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with_all(["SIZE", "DENSITY", "SEED"]),
                ),
        )
}

/// Builds an experiment configuration on top of the defaults.
fn experiment_config(matches: &ArgMatches) -> Config {
    let mut config = Config::default();
    if let Some(&size) = matches.get_one::<usize>("SIZE") {
        config.board_size = size;
    }
    if let Some(&steps) = matches.get_one::<u64>("STEPS") {
        config.num_steps = steps;
    }
    if let Some(&density) = matches.get_one::<f64>("DENSITY") {
        config.initial_density = density;
    }
    if let Some(&seed) = matches.get_one::<u64>("SEED") {
        config.seed = Some(seed);
    }

    let survival = matches.get_one::<BTreeSet<u32>>("SURVIVAL");
    let birth = matches.get_one::<BTreeSet<u32>>("BIRTH");
    let rules = match (matches.get_one::<RuleSet>("RULE"), survival, birth) {
        (Some(rules), _, _) => Some(rules.clone()),
        (None, None, None) => None,
        (None, survival, birth) => {
            let default = config.rule_set();
            Some(RuleSet::new(
                survival.unwrap_or(default.survival()).iter().copied(),
                birth.unwrap_or(default.birth()).iter().copied(),
            ))
        }
    };
    if let Some(rules) = rules {
        config = config.set_rules(&rules);
        config.name = format!("Life-like ({})", config.rules_notation);
    }

    if let Some(name) = matches.try_get_one::<String>("NAME").ok().flatten() {
        config.name = name.clone();
    }
    config
}

/// Reads settings from a file, choosing the format by its extension.
fn read_settings(path: &Path) -> Result<Settings, Box<dyn StdError>> {
    let text = fs::read_to_string(path)?;
    let settings = match path.extension().and_then(OsStr::to_str) {
        Some("toml") => toml::from_str(&text)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        Some("json") => serde_json::from_str(&text)?,
        _ => return Err("unknown format, expected .toml, .yaml or .json".into()),
    };
    Ok(settings)
}

impl Args {
    /// Parses the command-line arguments.
    pub(crate) fn parse() -> Result<Self, Error> {
        let mut app = app();
        let matches = app.try_get_matches_from_mut(env::args_os())?;

        let settings = match matches.get_one::<PathBuf>("SETTINGS") {
            Some(path) => read_settings(path).map_err(|e| {
                app.error(
                    ErrorKind::Io,
                    format!("cannot read settings from {}: {}", path.display(), e),
                )
            })?,
            None => Settings::default(),
        };
        let mut settings = settings
            .override_with(|key| env::var(key).ok())
            .map_err(|e| app.error(ErrorKind::InvalidValue, e))?;
        if let Some(dir) = matches.get_one::<PathBuf>("DATA_DIR") {
            settings = settings.set_data_dir(dir);
        }

        let action = match matches.subcommand() {
            Some(("run", m)) => Action::Run {
                config: experiment_config(m),
                quiet: m.get_flag("QUIET"),
                #[cfg(feature = "tui")]
                no_tui: m.get_flag("NOTUI"),
            },
            Some(("status", m)) => Action::Status(*m.get_one::<u64>("ID").unwrap_or(&0)),
            Some(("list", _)) => Action::List,
            Some(("analyze", m)) => Action::Analyze {
                id: *m.get_one::<u64>("ID").unwrap_or(&0),
                frames: m.get_flag("FRAMES"),
                width: m.get_one::<usize>("WIDTH").copied().unwrap_or(60),
                height: m.get_one::<usize>("HEIGHT").copied().unwrap_or(12),
            },
            Some(("simulate", m)) => {
                let initial = match m.get_one::<PathBuf>("INPUT") {
                    Some(path) => Some(
                        fs::read_to_string(path)
                            .map_err(Into::into)
                            .and_then(|text| Board::from_plaintext(&text))
                            .map_err(|e| {
                                app.error(
                                    ErrorKind::InvalidValue,
                                    format!("cannot read a board from {}: {}", path.display(), e),
                                )
                            })?,
                    ),
                    None => None,
                };
                Action::Simulate {
                    config: experiment_config(m),
                    initial,
                }
            }
            _ => return Err(app.error(ErrorKind::MissingSubcommand, "a subcommand is required")),
        };

        Ok(Args { settings, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_of(args: &[&str]) -> Result<Config, Error> {
        let matches = app().try_get_matches_from(args)?;
        let (_, m) = matches.subcommand().expect("a subcommand");
        Ok(experiment_config(m))
    }

    #[test]
    fn app_is_consistent() {
        app().debug_assert();
    }

    #[test]
    fn defaults() -> Result<(), Error> {
        assert_eq!(config_of(&["lifetrace", "run"])?, Config::default());
        Ok(())
    }

    #[test]
    fn experiment_options() -> Result<(), Error> {
        let config = config_of(&[
            "lifetrace", "run", "--size", "8", "--steps", "3", "--density", "0.25", "--rule",
            "B36/S23", "--seed", "5",
        ])?;
        assert_eq!(config.board_size, 8);
        assert_eq!(config.num_steps, 3);
        assert_eq!(config.initial_density, 0.25);
        assert_eq!(config.rule_set(), RuleSet::highlife());
        assert_eq!(config.rules_notation, "B36/S23");
        assert_eq!(config.name, "Life-like (B36/S23)");
        assert_eq!(config.seed, Some(5));
        Ok(())
    }

    #[test]
    fn count_lists() -> Result<(), Error> {
        let config = config_of(&["lifetrace", "simulate", "--birth", "3,6"])?;
        assert_eq!(config.survival_rules, vec![2, 3]);
        assert_eq!(config.birth_rules, vec![3, 6]);

        let config = config_of(&["lifetrace", "run", "--survival", "", "--birth", "2"])?;
        assert_eq!(config.rule_set(), RuleSet::seeds());
        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        for args in [
            &["lifetrace", "run", "--size", "0"][..],
            &["lifetrace", "run", "--size", "-3"],
            &["lifetrace", "run", "--density", "1.5"],
            &["lifetrace", "run", "--density", "half"],
            &["lifetrace", "run", "--survival", "2,x"],
            &["lifetrace", "run", "--rule", "B3/Q23"],
            &["lifetrace", "run", "--rule", "B3/S23", "--birth", "3"],
            &["lifetrace", "status", "abc"],
            &["lifetrace"],
        ] {
            assert!(app().try_get_matches_from(args).is_err(), "{:?}", args);
        }
    }

    #[test]
    fn global_options() -> Result<(), Error> {
        let matches = app().try_get_matches_from(["lifetrace", "list", "--data-dir", "/tmp/x"])?;
        assert_eq!(
            matches.get_one::<PathBuf>("DATA_DIR"),
            Some(&PathBuf::from("/tmp/x"))
        );
        Ok(())
    }
}
