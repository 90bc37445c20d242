use std::fmt::{self, Write as _};
use std::path::PathBuf;

use serde::Serialize;

use crate::common::{error::Error, Table, Value};
use crate::parser::HELP;
use crate::query_engine::{JoinSuggestion, JoinType, Report};
use crate::storage_engine::TableMetadata;

#[derive(Serialize, Debug, Clone)]
pub struct TableEntry {
    pub name: String,
    #[serde(flatten)]
    pub metadata: TableMetadata,
    pub rows: usize,
}

/// What a handled command produced, ready to be rendered as text or JSON.
#[derive(Serialize, Debug)]
pub enum Response {
    Error(Error),
    Stored {
        name: String,
        rows: usize,
        columns: usize,
    },
    Tables(Vec<TableEntry>),
    Preview {
        table: Table,
        limit: usize,
    },
    Schema(Table),
    Suggestions {
        left: String,
        right: String,
        suggestions: Vec<JoinSuggestion>,
        default_keys: Option<(String, String)>,
    },
    Joined {
        name: String,
        join_type: JoinType,
        left_key: String,
        right_key: String,
        rows: usize,
    },
    Values {
        column: String,
        values: Vec<Value>,
    },
    Report {
        report: Report,
        limit: usize,
    },
    Exported {
        path: PathBuf,
        rows: usize,
        bytes: usize,
    },
    Help,
    Quit,
}

impl Response {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Error(err) => write!(f, "Error: {}", err),
            Response::Stored {
                name,
                rows,
                columns,
            } => write!(f, "Stored {} ({} rows, {} columns)", name, rows, columns),
            Response::Tables(entries) if entries.is_empty() => {
                f.write_str("No tables loaded yet. Use load or connect.")
            }
            Response::Tables(entries) => {
                for entry in entries {
                    writeln!(
                        f,
                        "{:<24} {:<10} {:<24} {} rows",
                        entry.name, entry.metadata.domain, entry.metadata.alias, entry.rows
                    )?;
                }
                Ok(())
            }
            Response::Preview { table, limit } => f.write_str(&table.show(*limit)),
            Response::Schema(table) => f.write_str(&table.describe()),
            Response::Suggestions {
                left,
                right,
                suggestions,
                default_keys,
            } => {
                if suggestions.is_empty() {
                    writeln!(f, "No similar column names between {} and {}", left, right)?;
                }
                for suggestion in suggestions {
                    writeln!(
                        f,
                        "{:>3}  {}.{} = {}.{}",
                        suggestion.score, left, suggestion.left_column, right, suggestion.right_column
                    )?;
                }
                if let Some((left_key, right_key)) = default_keys {
                    write!(f, "Default join keys: {} = {}", left_key, right_key)?;
                }
                Ok(())
            }
            Response::Joined {
                name,
                join_type,
                left_key,
                right_key,
                rows,
            } => write!(
                f,
                "{} join on {} = {} stored as {} ({} rows); it is now the report table",
                join_type, left_key, right_key, name, rows
            ),
            Response::Values { column, values } => {
                let rendered: Vec<String> = values
                    .iter()
                    .map(|value| match value {
                        Value::Null => "<null>".to_owned(),
                        other => other.to_string(),
                    })
                    .collect();
                write!(f, "{}: {}", column, rendered.join(", "))
            }
            Response::Report { report, limit } => {
                let mut output = report.table.show(*limit);
                for warning in &report.warnings {
                    let _ = writeln!(output, "Warning: {}", warning);
                }
                if let Some(summary) = &report.summary {
                    let _ = writeln!(
                        output,
                        "Selected {} rows of {}: sum {:.2}, mean {:.2}, {:.1}% of total {:.2}",
                        summary.rows,
                        summary.column,
                        summary.sum,
                        summary.mean,
                        summary.percent_of_total,
                        summary.total
                    );
                }
                f.write_str(output.trim_end())
            }
            Response::Exported { path, rows, bytes } => write!(
                f,
                "Wrote {} rows ({} bytes) to {}",
                rows,
                bytes,
                path.display()
            ),
            Response::Help => f.write_str(HELP),
            Response::Quit => f.write_str("Bye"),
        }
    }
}
