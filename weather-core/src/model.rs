use chrono::NaiveDate;
use std::{convert::TryFrom, fmt, str::FromStr};
use tracing::debug;

use crate::error::QueryError;

/// Lowercases and drops separators so "Cloud Cover", "cloud-cover" and
/// "CloudCover" compare equal.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Weather variables offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Temperature,
    Rainfall,
    Windspeed,
    DustConcentration,
    Snowfall,
    CloudCover,
}

impl Variable {
    /// Label shown in the form and written to exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Temperature => "Temperature",
            Variable::Rainfall => "Rainfall",
            Variable::Windspeed => "Windspeed",
            Variable::DustConcentration => "Dust Concentration",
            Variable::Snowfall => "Snowfall",
            Variable::CloudCover => "Cloud Cover",
        }
    }

    pub const fn all() -> &'static [Variable] {
        &[
            Variable::Temperature,
            Variable::Rainfall,
            Variable::Windspeed,
            Variable::DustConcentration,
            Variable::Snowfall,
            Variable::CloudCover,
        ]
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(value);
        Variable::all()
            .iter()
            .copied()
            .find(|v| normalize(v.as_str()) == wanted)
            .ok_or_else(|| QueryError::UnknownVariable(value.to_string()))
    }
}

impl TryFrom<&str> for Variable {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Granularity of the time frame. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeFrameMode {
    #[default]
    Day,
    Month,
    Season,
}

impl TimeFrameMode {
    /// Lower-case tag used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrameMode::Day => "day",
            TimeFrameMode::Month => "month",
            TimeFrameMode::Season => "season",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrameMode::Day => "Specific Day",
            TimeFrameMode::Month => "Month",
            TimeFrameMode::Season => "Season",
        }
    }

    pub const fn all() -> &'static [TimeFrameMode] {
        &[TimeFrameMode::Day, TimeFrameMode::Month, TimeFrameMode::Season]
    }
}

impl fmt::Display for TimeFrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrameMode {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "day" | "date" => Ok(TimeFrameMode::Day),
            "month" => Ok(TimeFrameMode::Month),
            "season" => Ok(TimeFrameMode::Season),
            _ => Err(QueryError::UnknownTimeFrameMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub const fn all() -> &'static [Month] {
        &[
            Month::January,
            Month::February,
            Month::March,
            Month::April,
            Month::May,
            Month::June,
            Month::July,
            Month::August,
            Month::September,
            Month::October,
            Month::November,
            Month::December,
        ]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = QueryError;

    /// Accepts the full name or its three-letter abbreviation, any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        Month::all()
            .iter()
            .copied()
            .find(|m| {
                let name = m.as_str().to_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .ok_or_else(|| QueryError::UnknownMonth(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    pub const fn all() -> &'static [Season] {
        &[Season::Spring, Season::Summer, Season::Fall, Season::Winter]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            _ => Err(QueryError::UnknownSeason(value.to_string())),
        }
    }
}

/// A concrete time-frame value, tagged with the mode it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrameValue {
    Day(NaiveDate),
    Month(Month),
    Season(Season),
}

impl TimeFrameValue {
    pub fn mode(&self) -> TimeFrameMode {
        match self {
            TimeFrameValue::Day(_) => TimeFrameMode::Day,
            TimeFrameValue::Month(_) => TimeFrameMode::Month,
            TimeFrameValue::Season(_) => TimeFrameMode::Season,
        }
    }

    /// Parse raw input for the given mode. Dates use `YYYY-MM-DD`.
    pub fn parse(mode: TimeFrameMode, value: &str) -> Result<Self, QueryError> {
        match mode {
            TimeFrameMode::Day => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map(TimeFrameValue::Day)
                .map_err(|source| QueryError::InvalidDate { value: value.to_string(), source }),
            TimeFrameMode::Month => value.parse().map(TimeFrameValue::Month),
            TimeFrameMode::Season => value.parse().map(TimeFrameValue::Season),
        }
    }
}

/// Read-only view of the active time frame. The inner value is `None` while
/// the user has not picked one yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Day(Option<NaiveDate>),
    Month(Option<Month>),
    Season(Option<Season>),
}

impl TimeFrame {
    pub fn mode(&self) -> TimeFrameMode {
        match self {
            TimeFrame::Day(_) => TimeFrameMode::Day,
            TimeFrame::Month(_) => TimeFrameMode::Month,
            TimeFrame::Season(_) => TimeFrameMode::Season,
        }
    }

    pub fn value(&self) -> Option<TimeFrameValue> {
        match *self {
            TimeFrame::Day(date) => date.map(TimeFrameValue::Day),
            TimeFrame::Month(month) => month.map(TimeFrameValue::Month),
            TimeFrame::Season(season) => season.map(TimeFrameValue::Season),
        }
    }
}

/// The query a user is composing.
///
/// One value slot is kept per time-frame mode. Switching modes leaves the
/// other slots untouched (dormant), so switching back restores what was
/// entered. Only [`QueryConfig::time_frame`] exposes the time frame, and it
/// reports the active slot alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryConfig {
    location: String,
    variables: Vec<Variable>,
    mode: TimeFrameMode,
    date: Option<NaiveDate>,
    month: Option<Month>,
    season: Option<Season>,
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Selected variables in the order they were picked.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn has_variable(&self, variable: Variable) -> bool {
        self.variables.contains(&variable)
    }

    pub fn time_frame_mode(&self) -> TimeFrameMode {
        self.mode
    }

    pub fn time_frame(&self) -> TimeFrame {
        match self.mode {
            TimeFrameMode::Day => TimeFrame::Day(self.date),
            TimeFrameMode::Month => TimeFrame::Month(self.month),
            TimeFrameMode::Season => TimeFrame::Season(self.season),
        }
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Removes `variable` if selected, otherwise appends it. Re-selecting a
    /// variable puts it last; the others keep their relative order.
    pub fn toggle_variable(&mut self, variable: Variable) {
        if let Some(pos) = self.variables.iter().position(|v| *v == variable) {
            self.variables.remove(pos);
        } else {
            self.variables.push(variable);
        }
    }

    pub fn set_time_frame_mode(&mut self, mode: TimeFrameMode) {
        self.mode = mode;
    }

    /// Stores `value` in the slot of its own mode. A value for an inactive
    /// mode stays dormant until that mode is selected.
    pub fn set_time_frame_value(&mut self, value: TimeFrameValue) {
        if value.mode() != self.mode {
            debug!(
                active = %self.mode,
                value_mode = %value.mode(),
                "time frame value set for an inactive mode"
            );
        }

        match value {
            TimeFrameValue::Day(date) => self.date = Some(date),
            TimeFrameValue::Month(month) => self.month = Some(month),
            TimeFrameValue::Season(season) => self.season = Some(season),
        }
    }

    /// Empties the slot of the active mode.
    pub fn clear_time_frame_value(&mut self) {
        match self.mode {
            TimeFrameMode::Day => self.date = None,
            TimeFrameMode::Month => self.month = None,
            TimeFrameMode::Season => self.season = None,
        }
    }

    /// Export needs a location and at least one variable; the time frame may
    /// be left blank.
    pub fn is_export_ready(&self) -> bool {
        !self.location.is_empty() && !self.variables.is_empty()
    }
}
