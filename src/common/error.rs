use serde::Serialize;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    // Unreadable or unsupported input during ingestion
    #[error("Ingestion failed: {0}")]
    IngestError(String),
    // Unknown table or column
    #[error("{0}")]
    SchemaError(String),
    #[error("Join failed: {0}")]
    JoinError(String),
    #[error("Analysis failed: {0}")]
    AnalysisError(String),
    #[error("{0}")]
    ParseError(String),
}

// Errors cross into the JSON render model as their message only, since the
// wrapped library errors are not serializable themselves.
impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
