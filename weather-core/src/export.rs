//! Turns a [`QueryConfig`] snapshot into a downloadable CSV or JSON artifact.
//!
//! Both formats flatten the query into the same row: the active time-frame
//! field is filled in and the two others are always empty strings, whatever
//! dormant values the config still holds.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::{convert::TryFrom, fmt, str::FromStr};
use tracing::debug;

use crate::{
    error::QueryError,
    model::{QueryConfig, TimeFrame},
};

/// Base name of every exported file.
pub const EXPORT_FILE_STEM: &str = "weather_data";

pub const CSV_HEADER: [&str; 8] =
    ["Location", "Variables", "TimeFrame", "Date", "Month", "Season", "Units", "Source"];

/// Fixed metadata attached to every export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportMetadata {
    pub units: &'static str,
    pub source: &'static str,
}

pub const EXPORT_METADATA: ExportMetadata =
    ExportMetadata { units: "Metric", source: "NASA Earth Observation Data" };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    /// File extension; identical to the format name.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub const fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Csv, ExportFormat::Json]
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(QueryError::UnknownFormat(value.to_string())),
        }
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A serialized query, ready to be handed to whatever saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub content: String,
    pub mime_type: &'static str,
    pub file_extension: &'static str,
}

impl Export {
    /// `weather_data.<extension>`
    pub fn file_name(&self) -> String {
        format!("{EXPORT_FILE_STEM}.{}", self.file_extension)
    }
}

/// The query flattened into one record shared by both formats.
struct FlatRow<'a> {
    location: &'a str,
    variables: Vec<&'static str>,
    time_frame: &'static str,
    date: String,
    month: &'static str,
    season: &'static str,
}

impl<'a> FlatRow<'a> {
    fn from_config(config: &'a QueryConfig) -> Self {
        let time_frame = config.time_frame();

        let (date, month, season) = match time_frame {
            TimeFrame::Day(date) => {
                (date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(), "", "")
            }
            TimeFrame::Month(month) => (String::new(), month.map_or("", |m| m.as_str()), ""),
            TimeFrame::Season(season) => (String::new(), "", season.map_or("", |s| s.as_str())),
        };

        Self {
            location: config.location(),
            variables: config.variables().iter().map(|v| v.as_str()).collect(),
            time_frame: time_frame.mode().as_str(),
            date,
            month,
            season,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    location: &'a str,
    variables: &'a [&'static str],
    time_frame: &'static str,
    date: &'a str,
    month: &'static str,
    season: &'static str,
    metadata: ExportMetadata,
}

fn to_json(row: &FlatRow<'_>) -> Result<String, QueryError> {
    let doc = JsonExport {
        location: row.location,
        variables: &row.variables,
        time_frame: row.time_frame,
        date: &row.date,
        month: row.month,
        season: row.season,
        metadata: EXPORT_METADATA,
    };

    Ok(serde_json::to_string_pretty(&doc)?)
}

fn to_csv(row: &FlatRow<'_>) -> Result<String, QueryError> {
    // Fields go out verbatim; only the variable list is wrapped in quotes.
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let variables = format!("\"{}\"", row.variables.join(","));
    // The artifact is one header line and one data line.
    let location = row.location.replace(['\r', '\n'], " ");

    writer.write_record(CSV_HEADER)?;
    writer.write_record([
        location.as_str(),
        variables.as_str(),
        row.time_frame,
        row.date.as_str(),
        row.month,
        row.season,
        EXPORT_METADATA.units,
        EXPORT_METADATA.source,
    ])?;

    let bytes = writer.into_inner().map_err(|err| QueryError::Io(err.into_error()))?;
    let mut content = String::from_utf8(bytes)?;

    // No newline after the data line.
    if content.ends_with('\n') {
        content.pop();
    }

    Ok(content)
}

/// Serialize `config` in the requested format.
///
/// Does not check [`QueryConfig::is_export_ready`]; callers gate on it.
pub fn serialize(config: &QueryConfig, format: ExportFormat) -> Result<Export, QueryError> {
    let row = FlatRow::from_config(config);

    let content = match format {
        ExportFormat::Csv => to_csv(&row)?,
        ExportFormat::Json => to_json(&row)?,
    };

    debug!(%format, bytes = content.len(), "serialized query");

    Ok(Export {
        content,
        mime_type: format.mime_type(),
        file_extension: format.extension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Month, Season, TimeFrameMode, TimeFrameValue, Variable};
    use chrono::NaiveDate;

    fn austin_in_march() -> QueryConfig {
        let mut cfg = QueryConfig::new();
        cfg.set_location("Austin");
        cfg.toggle_variable(Variable::Temperature);
        cfg.toggle_variable(Variable::Rainfall);
        cfg.set_time_frame_mode(TimeFrameMode::Month);
        cfg.set_time_frame_value(TimeFrameValue::Month(Month::March));
        cfg
    }

    #[test]
    fn csv_matches_expected_bytes() {
        let export = serialize(&austin_in_march(), ExportFormat::Csv).unwrap();

        assert_eq!(
            export.content,
            "Location,Variables,TimeFrame,Date,Month,Season,Units,Source\n\
             Austin,\"Temperature,Rainfall\",month,,March,,Metric,NASA Earth Observation Data"
        );
        assert_eq!(export.mime_type, "text/csv");
        assert_eq!(export.file_extension, "csv");
        assert_eq!(export.file_name(), "weather_data.csv");
    }

    #[test]
    fn csv_always_has_two_lines() {
        let configs = [QueryConfig::new(), austin_in_march()];
        for cfg in &configs {
            let export = serialize(cfg, ExportFormat::Csv).unwrap();
            let lines: Vec<&str> = export.content.split('\n').collect();
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0], CSV_HEADER.join(","));
        }
    }

    #[test]
    fn csv_empty_config_keeps_all_columns() {
        let export = serialize(&QueryConfig::new(), ExportFormat::Csv).unwrap();
        let data = export.content.lines().nth(1).unwrap();
        assert_eq!(data, ",\"\",day,,,,Metric,NASA Earth Observation Data");
    }

    #[test]
    fn csv_writes_location_verbatim() {
        let mut cfg = QueryConfig::new();
        cfg.set_location("Paris, \"FR\"");
        cfg.toggle_variable(Variable::DustConcentration);
        cfg.toggle_variable(Variable::CloudCover);

        let export = serialize(&cfg, ExportFormat::Csv).unwrap();
        let data = export.content.lines().nth(1).unwrap();
        assert_eq!(
            data,
            "Paris, \"FR\",\"Dust Concentration,Cloud Cover\",day,,,,Metric,NASA Earth Observation Data"
        );
    }

    #[test]
    fn csv_flattens_line_breaks_in_location() {
        let mut cfg = QueryConfig::new();
        cfg.set_location("Austin\nTX\r\nUSA");
        cfg.toggle_variable(Variable::Rainfall);

        let export = serialize(&cfg, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = export.content.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Austin TX  USA,\"Rainfall\",day,,,,Metric,NASA Earth Observation Data");

        let json = serialize(&cfg, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json.content).unwrap();
        assert_eq!(value["location"], "Austin\nTX\r\nUSA");
    }

    #[test]
    fn csv_day_mode_formats_date() {
        let mut cfg = QueryConfig::new();
        cfg.set_location("Oslo");
        cfg.toggle_variable(Variable::Snowfall);
        cfg.set_time_frame_value(TimeFrameValue::Day(NaiveDate::from_ymd_opt(2024, 2, 9).unwrap()));

        let export = serialize(&cfg, ExportFormat::Csv).unwrap();
        assert!(export.content.ends_with("Oslo,\"Snowfall\",day,2024-02-09,,,Metric,NASA Earth Observation Data"));
    }

    #[test]
    fn json_blanks_inactive_fields() {
        let export = serialize(&austin_in_march(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export.content).unwrap();

        assert_eq!(value["month"], "March");
        assert_eq!(value["date"], "");
        assert_eq!(value["season"], "");
        assert_eq!(value["timeFrame"], "month");
        assert_eq!(export.mime_type, "application/json");
        assert_eq!(export.file_name(), "weather_data.json");
    }

    #[test]
    fn json_roundtrips_query() {
        let cfg = austin_in_march();
        let export = serialize(&cfg, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export.content).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "location": "Austin",
                "variables": ["Temperature", "Rainfall"],
                "timeFrame": "month",
                "date": "",
                "month": "March",
                "season": "",
                "metadata": {
                    "units": "Metric",
                    "source": "NASA Earth Observation Data"
                }
            })
        );
    }

    #[test]
    fn json_uses_stable_key_order_and_two_space_indent() {
        let export = serialize(&austin_in_march(), ExportFormat::Json).unwrap();
        let expected = r#"{
  "location": "Austin",
  "variables": [
    "Temperature",
    "Rainfall"
  ],
  "timeFrame": "month",
  "date": "",
  "month": "March",
  "season": "",
  "metadata": {
    "units": "Metric",
    "source": "NASA Earth Observation Data"
  }
}"#;
        assert_eq!(export.content, expected);
    }

    #[test]
    fn dormant_values_never_leak_into_output() {
        let mut cfg = austin_in_march();
        cfg.set_time_frame_value(TimeFrameValue::Season(Season::Winter));
        cfg.set_time_frame_mode(TimeFrameMode::Day);

        let csv = serialize(&cfg, ExportFormat::Csv).unwrap();
        assert!(csv.content.ends_with("Austin,\"Temperature,Rainfall\",day,,,,Metric,NASA Earth Observation Data"));

        let json = serialize(&cfg, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json.content).unwrap();
        assert_eq!(value["month"], "");
        assert_eq!(value["season"], "");

        cfg.set_time_frame_mode(TimeFrameMode::Month);
        let csv = serialize(&cfg, ExportFormat::Csv).unwrap();
        assert!(csv.content.contains(",month,,March,,"));
    }

    #[test]
    fn serialize_is_deterministic() {
        let cfg = austin_in_march();
        for format in ExportFormat::all() {
            let a = serialize(&cfg, *format).unwrap();
            let b = serialize(&cfg, *format).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn format_parse_and_unknown() {
        assert_eq!(ExportFormat::try_from("JSON").unwrap(), ExportFormat::Json);
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("Unknown export format"));
    }
}
