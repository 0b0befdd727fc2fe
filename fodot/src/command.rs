use crate::terminal::Stylus;
use crate::{constants::*, utils::*};
use anyhow::Error;
use fodot_expand::{
    bounder::ModelCap,
    context::Context,
    ground::GroundConfig,
    solver::{Mode, Outcome, Solver},
    strategy::Dispatch,
    trace::{subscriber::JsonLogger, DEFAULT_JSON_LOG_FILE},
};
use itertools::Itertools;
use std::fs;
use structopt::StructOpt;

const MODES: [&str; 3] = ["first", "all", "count"];
const STRATEGIES: [&str; 2] = ["first-fail", "linear"];

#[derive(StructOpt, Clone, Copy)]
enum ModeOption {
    #[structopt(about = "Stop at the first model.")]
    First,
    #[structopt(about = "Enumerate all models.")]
    All,
    #[structopt(about = "Count the models without printing them.")]
    Count,
}

impl std::str::FromStr for ModeOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(ModeOption::First),
            "all" => Ok(ModeOption::All),
            "count" => Ok(ModeOption::Count),
            _ => Err(format!(
                "invalid mode '{}'; expecting one of {}",
                s,
                MODES.iter().join(", ")
            )),
        }
    }
}

impl From<ModeOption> for Mode {
    fn from(option: ModeOption) -> Self {
        match option {
            ModeOption::First => Mode::FirstModel,
            ModeOption::All => Mode::AllModels,
            ModeOption::Count => Mode::CountModels,
        }
    }
}

#[derive(StructOpt, Clone, Copy)]
enum StrategyOption {
    #[structopt(about = "Branch on the variable with the fewest values first.")]
    FirstFail,
    #[structopt(about = "Branch on variables in declaration order.")]
    Linear,
}

impl std::str::FromStr for StrategyOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-fail" => Ok(StrategyOption::FirstFail),
            "linear" => Ok(StrategyOption::Linear),
            _ => Err(format!(
                "invalid strategy '{}'; expecting one of {}",
                s,
                STRATEGIES.iter().join(", ")
            )),
        }
    }
}

impl From<StrategyOption> for Dispatch {
    fn from(option: StrategyOption) -> Self {
        match option {
            StrategyOption::FirstFail => Dispatch::new_first_fail(),
            StrategyOption::Linear => Dispatch::new_linear(),
        }
    }
}

#[derive(StructOpt)]
enum ProcessCommand {
    #[structopt(name = "solve", about = "Find models for the input theory")]
    Solve {
        #[structopt(
            short = "i",
            long = "input",
            parse(from_os_str),
            help = "Path to the input theory file"
        )]
        input: Option<std::path::PathBuf>,
        #[structopt(short = "a", long = "all", help = "Find all models")]
        all: bool,
        #[structopt(long = "count", help = "Number of models to return")]
        count: Option<u64>,
        #[structopt(short = "m", long = "mode", help = "One of first, all or count")]
        mode: Option<ModeOption>,
        #[structopt(
            short = "w",
            long = "workers",
            default_value = "1",
            help = "Number of worker threads"
        )]
        workers: usize,
        #[structopt(long = "json", help = "Print models as JSON")]
        json: bool,
        #[structopt(
            short = "s",
            long = "strategy",
            default_value = "first-fail",
            help = "One of first-fail or linear"
        )]
        strategy: StrategyOption,
    },
    #[structopt(name = "check", about = "Decide whether the input theory has a model")]
    Check {
        #[structopt(
            short = "i",
            long = "input",
            parse(from_os_str),
            help = "Path to the input theory file"
        )]
        input: Option<std::path::PathBuf>,
    },
    #[structopt(
        name = "propagate",
        about = "Print the values every symbol takes in some model"
    )]
    Propagate {
        #[structopt(
            short = "i",
            long = "input",
            parse(from_os_str),
            help = "Path to the input theory file"
        )]
        input: Option<std::path::PathBuf>,
    },
}

impl ProcessCommand {
    fn run(self, config: GroundConfig, stylus: &Stylus) -> Result<(), Error> {
        match self {
            ProcessCommand::Solve {
                input,
                all,
                count,
                mode,
                workers,
                json,
                strategy,
            } => {
                let kb = read_kb(input)?;
                let context = Context::with_config(&kb, config)?;

                let mode = match mode {
                    Some(mode) => Mode::from(mode),
                    None if all || count.is_some() => Mode::AllModels,
                    None => Mode::FirstModel,
                };
                let mut solver = Solver::new(mode)
                    .with_strategy(Dispatch::from(strategy))
                    .with_workers(workers);
                if let Some(count) = count {
                    solver = solver.with_bounder(ModelCap::from(count));
                }

                if !json {
                    print_theory(&kb, stylus);
                }
                let expansion = context.expand(&solver)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(expansion.outcome.models())?);
                    return Ok(());
                }

                expansion
                    .outcome
                    .models()
                    .iter()
                    .enumerate()
                    .for_each(|(i, model)| print_model(model, stylus, i + 1));
                println!();

                stylus.set(STYLE_INFO);
                match &expansion.outcome {
                    Outcome::Models(models) => println!("{} model(s) were found.", models.len()),
                    Outcome::Count(count) => println!("The theory has {} model(s).", count),
                    Outcome::Unsatisfiable => println!("The theory is unsatisfiable."),
                    Outcome::Stopped { count, reason, .. } => {
                        println!("Stopped after {} model(s): {}.", count, reason)
                    }
                }
                println!("{}", expansion.stats);
                println!();
                Ok(())
            }
            ProcessCommand::Check { input } => {
                let kb = read_kb(input)?;
                let context = Context::with_config(&kb, config)?;
                stylus.set(STYLE_INFO);
                if context.check()? {
                    println!("sat");
                } else {
                    println!("unsat");
                }
                Ok(())
            }
            ProcessCommand::Propagate { input } => {
                let kb = read_kb(input)?;
                let context = Context::with_config(&kb, config)?;
                print_theory(&kb, stylus);
                match context.propagate(&Solver::default())? {
                    Some(consequences) => print_consequences(&consequences, stylus),
                    None => {
                        stylus.set(STYLE_ERROR);
                        println!("The theory is unsatisfiable.");
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(StructOpt)]
#[structopt(
    name = "fodot",
    about = "A tool for finding models of typed first-order theories over finite domains"
)]
#[structopt(raw(setting = "structopt::clap::AppSettings::ColoredHelp"))]
pub(super) struct Command {
    #[structopt(subcommand, name = "command")]
    command: ProcessCommand,
    #[structopt(long = "no-color", help = "Disable colored output.")]
    no_color: bool,
    #[structopt(
        short = "l",
        long = "log",
        parse(from_os_str),
        help = "Path to the log file."
    )]
    log: Option<std::path::PathBuf>,
    #[structopt(
        long = "max-domain",
        help = "Largest domain inferred for an integer symbol."
    )]
    max_domain: Option<usize>,
}

impl Command {
    pub fn run(self) -> Result<(), Error> {
        let process = self.command;
        let stylus = stylus(!self.no_color);

        let mut config = GroundConfig::default();
        if let Some(max_domain) = self.max_domain {
            config = config.max_domain_size(max_domain);
        }

        let log = self
            .log
            .map(|l| l.to_str().unwrap_or(DEFAULT_JSON_LOG_FILE).to_owned());

        if !self.no_color {
            stylus.set(STYLE_LOGO);
            println!("{}", ASCII_ART);
        }

        let run = || process.run(config, &stylus);

        if let Some(log) = log {
            let log = fs::File::create(log)
                .map_err(|e| Error::new(e).context("cannot create the log file"))?;
            let logger = JsonLogger::new(log);
            tracing::subscriber::with_default(logger, run)
        } else {
            run()
        }
    }
}
