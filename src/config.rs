use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Loan tracking REPL with balance checks and payment forecasting.
#[derive(Parser, Debug)]
#[command(name = "riba", version, about)]
pub struct Cli {
    /// Calendar date of month 0 (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Width of the forecast chart in characters
    #[arg(long, default_value_t = 60)]
    pub chart_width: usize,

    /// Height of the forecast chart in lines
    #[arg(long, default_value_t = 15)]
    pub chart_height: usize,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Print single-server queue statistics instead of starting the REPL
    Queue {
        /// Arrival rate (lambda)
        #[arg(long)]
        arrival: f64,
        /// Departure rate (mu)
        #[arg(long)]
        departure: f64,
        /// Number of elements on the queue
        #[arg(long, default_value_t = 0)]
        n: u32,
    },
}

/// Runtime settings for a REPL session.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub start_date: NaiveDate,
    pub log_level: LevelFilter,
    pub chart_width: usize,
    pub chart_height: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_date: Local::now().date_naive(),
            log_level: LevelFilter::Info,
            chart_width: 60,
            chart_height: 15,
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        let defaults = Config::default();
        let log_level = if cli.verbose {
            LevelFilter::Debug
        } else if cli.quiet {
            LevelFilter::Warn
        } else {
            defaults.log_level
        };

        Self {
            start_date: cli.start_date.unwrap_or(defaults.start_date),
            log_level,
            chart_width: cli.chart_width,
            chart_height: cli.chart_height,
        }
    }
}
