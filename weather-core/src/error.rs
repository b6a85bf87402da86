use thiserror::Error;

/// Errors produced while parsing user input or encoding an export.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(
        "Unknown variable '{0}'. Supported variables: temperature, rainfall, windspeed, \
         dust-concentration, snowfall, cloud-cover."
    )]
    UnknownVariable(String),

    #[error("Unknown time frame '{0}'. Supported time frames: day, month, season.")]
    UnknownTimeFrameMode(String),

    #[error("Unknown month '{0}'. Expected a month name such as 'March' or 'mar'.")]
    UnknownMonth(String),

    #[error("Unknown season '{0}'. Supported seasons: spring, summer, fall, winter.")]
    UnknownSeason(String),

    #[error("Unknown export format '{0}'. Supported formats: csv, json.")]
    UnknownFormat(String),

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Failed to encode JSON export")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode CSV export")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush export buffer")]
    Io(#[from] std::io::Error),

    #[error("Export buffer is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
