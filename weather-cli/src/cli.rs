use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use inquire::InquireError;
use std::{io, path::PathBuf};
use weather_query_core::{
    Config, ExportFormat, Month, QueryAction, QueryConfig, QueryStore, Season, TimeFrameMode,
    TimeFrameValue, Variable, serialize,
};

use crate::{download, form};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-query",
    version,
    about = "Compose a weather query and export it as CSV or JSON"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill in the query form interactively, then export it.
    Form {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export a query described entirely by flags.
    Export(ExportArgs),

    /// List the variables that can be queried.
    Variables,

    /// Edit saved defaults (output directory, format, pre-selected variables).
    Configure,
}

/// Where and how the artifact is written.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Export format, "csv" or "json". Falls back to the configured default.
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Directory to write `weather_data.<ext>` into.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the artifact to stdout instead of saving it.
    #[arg(long, conflicts_with = "out_dir")]
    pub stdout: bool,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("time_frame")
        .args(["time_frame_mode", "date", "month", "season"])
        .multiple(false)
))]
pub struct ExportArgs {
    /// Location name, free text.
    #[arg(short, long, default_value = "")]
    pub location: String,

    /// Variable to include; repeat or comma-separate (e.g. temperature,cloud-cover).
    #[arg(long = "variable", value_delimiter = ',')]
    pub variables: Vec<Variable>,

    /// Select a time-frame mode without a value (day, month, season).
    #[arg(long = "time-frame", value_name = "MODE")]
    pub time_frame_mode: Option<TimeFrameMode>,

    /// Specific day, YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Month name, e.g. March.
    #[arg(long)]
    pub month: Option<Month>,

    /// Season: spring, summer, fall or winter.
    #[arg(long)]
    pub season: Option<Season>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ExportArgs {
    /// Translate the flags into the same actions the interactive form dispatches.
    pub fn actions(&self) -> Vec<QueryAction> {
        let mut actions = vec![QueryAction::SetLocation(self.location.clone())];

        let mut seen = Vec::new();
        for variable in &self.variables {
            // A repeated flag must not toggle the variable back off.
            if !seen.contains(variable) {
                seen.push(*variable);
                actions.push(QueryAction::ToggleVariable(*variable));
            }
        }

        let value = match (self.date, self.month, self.season) {
            (Some(date), _, _) => Some(TimeFrameValue::Day(date)),
            (_, Some(month), _) => Some(TimeFrameValue::Month(month)),
            (_, _, Some(season)) => Some(TimeFrameValue::Season(season)),
            _ => None,
        };

        let mode = value.map(|v| v.mode()).or(self.time_frame_mode).unwrap_or_default();
        actions.push(QueryAction::SetTimeFrameMode(mode));
        if let Some(value) = value {
            actions.push(QueryAction::SetTimeFrameValue(value));
        }

        actions
    }

    pub fn build_store(&self) -> QueryStore {
        let mut store = QueryStore::new();
        for action in self.actions() {
            store.dispatch(action);
        }
        store
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Form { output } => {
                let settings = Config::load()?;
                allow_cancel(form::run_form(&settings, &output))
            }
            Command::Export(args) => {
                let settings = Config::load()?;
                let store = args.build_store();
                let format = resolve_format(&args.output, &settings)?.unwrap_or(ExportFormat::Csv);
                export_query(store.config(), format, &args.output, &settings)
            }
            Command::Variables => {
                for variable in Variable::all() {
                    println!("{variable}");
                }
                Ok(())
            }
            Command::Configure => allow_cancel(form::configure()),
        }
    }
}

/// Esc / Ctrl-C inside a prompt ends the command without an error.
fn allow_cancel(result: Result<()>) -> Result<()> {
    match result {
        Err(err)
            if matches!(
                err.downcast_ref::<InquireError>(),
                Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
            ) =>
        {
            println!("Cancelled, nothing exported.");
            Ok(())
        }
        other => other,
    }
}

/// Command-line format first, then the configured default.
pub fn resolve_format(output: &OutputArgs, settings: &Config) -> Result<Option<ExportFormat>> {
    match output.format {
        Some(format) => Ok(Some(format)),
        None => settings.default_format(),
    }
}

/// Explains why export is unavailable, or `None` when the query is ready.
pub fn readiness_problem(config: &QueryConfig) -> Option<String> {
    let mut missing = Vec::new();
    if config.location().is_empty() {
        missing.push("a location");
    }
    if config.variables().is_empty() {
        missing.push("at least one variable");
    }

    if missing.is_empty() {
        None
    } else {
        Some(format!("Export is disabled until the query has {}.", missing.join(" and ")))
    }
}

/// Serialize `config` and hand the artifact to the download step.
pub fn export_query(
    config: &QueryConfig,
    format: ExportFormat,
    output: &OutputArgs,
    settings: &Config,
) -> Result<()> {
    if let Some(problem) = readiness_problem(config) {
        bail!("{problem}\nHint: pass --location and --variable, or use `weather-query form`.");
    }

    let export = serialize(config, format)?;

    if output.stdout {
        download::write_export(&export, io::stdout().lock())?;
    } else {
        let dir = output.out_dir.clone().unwrap_or_else(|| settings.output_dir_or_current());
        let path = download::save_export(&export, &dir)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
