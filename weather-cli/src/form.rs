//! Interactive prompts: the query form and the `configure` editor.

use anyhow::{Context, Result};
use inquire::{DateSelect, MultiSelect, Select, Text};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use weather_query_core::{
    Config, ExportFormat, Month, QueryAction, QueryStore, Season, TimeFrameMode, TimeFrameValue,
    Variable,
};

use crate::cli::{OutputArgs, export_query, readiness_problem, resolve_format};

/// Indices of `selected` within `options`, for pre-checking a multi-select.
fn default_indices<T: PartialEq>(options: &[T], selected: &[T]) -> Vec<usize> {
    options
        .iter()
        .enumerate()
        .filter(|(_, option)| selected.contains(option))
        .map(|(i, _)| i)
        .collect()
}

pub fn run_form(settings: &Config, output: &OutputArgs) -> Result<()> {
    let mut store = QueryStore::new();

    let mut was_ready = false;
    store.subscribe(move |config, _| {
        let ready = config.is_export_ready();
        if ready != was_ready {
            info!(ready, "export availability changed");
            was_ready = ready;
        }
    });

    let location = Text::new("Location:")
        .with_help_message("City, region or coordinates")
        .prompt()?;
    store.dispatch(QueryAction::SetLocation(location));

    let preselected = settings.default_variables()?;
    let defaults = default_indices(Variable::all(), &preselected);
    let variables = MultiSelect::new("Variables:", Variable::all().to_vec())
        .with_default(&defaults)
        .prompt()?;
    for variable in variables {
        store.dispatch(QueryAction::ToggleVariable(variable));
    }

    let labels: Vec<&str> = TimeFrameMode::all().iter().map(|m| m.label()).collect();
    let picked = Select::new("Time frame:", labels).raw_prompt()?;
    let mode = TimeFrameMode::all()[picked.index];
    store.dispatch(QueryAction::SetTimeFrameMode(mode));

    let value = match mode {
        TimeFrameMode::Day => DateSelect::new("Date:")
            .with_help_message("Esc to leave blank")
            .prompt_skippable()?
            .map(TimeFrameValue::Day),
        TimeFrameMode::Month => Select::new("Month:", Month::all().to_vec())
            .with_help_message("Esc to leave blank")
            .prompt_skippable()?
            .map(TimeFrameValue::Month),
        TimeFrameMode::Season => Select::new("Season:", Season::all().to_vec())
            .with_help_message("Esc to leave blank")
            .prompt_skippable()?
            .map(TimeFrameValue::Season),
    };
    match value {
        Some(value) => store.dispatch(QueryAction::SetTimeFrameValue(value)),
        None => store.dispatch(QueryAction::ClearTimeFrameValue),
    }

    let config = store.snapshot();
    if let Some(problem) = readiness_problem(&config) {
        // Same condition that greys out the export buttons.
        println!("{problem}");
        return Ok(());
    }

    let format = match resolve_format(output, settings)? {
        Some(format) => format,
        None => Select::new("Export as:", ExportFormat::all().to_vec()).prompt()?,
    };

    debug!(?config, %format, "exporting form");
    export_query(&config, format, output, settings)
}

pub fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let current_dir =
        config.output_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
    let dir = Text::new("Output directory:")
        .with_initial_value(&current_dir)
        .with_help_message("Leave blank to export into the current directory")
        .prompt()?;
    let dir = dir.trim();
    config.output_dir = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };

    let current_format = config.default_format().unwrap_or_else(|err| {
        warn!("ignoring saved default format: {err}");
        None
    });
    let cursor = current_format
        .and_then(|f| ExportFormat::all().iter().position(|candidate| *candidate == f))
        .unwrap_or(0);
    let format = Select::new("Default export format:", ExportFormat::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_default_format(format);

    let current_variables = config.default_variables().unwrap_or_else(|err| {
        warn!("ignoring saved default variables: {err:#}");
        Vec::new()
    });
    let defaults = default_indices(Variable::all(), &current_variables);
    let variables = MultiSelect::new("Pre-selected variables:", Variable::all().to_vec())
        .with_default(&defaults)
        .prompt()?;
    config.set_default_variables(&variables);

    let path = config.save().context("Failed to save configuration")?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
