//! The report pipeline: join, then filter, group-and-sum, drill-down and
//! export. Every stage takes a table and builds a new one.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::common::{Error, Table};
use crate::storage_engine::TableStore;

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod join;
pub mod selection;
pub mod suggest;

pub use aggregate::{group_sum, sum_column_name};
pub use export::{export, to_csv};
pub use filter::{distinct_values, filter, Filter};
pub use join::{join, JoinType};
pub use selection::{analysis_column, summarize, SelectionSummary};
pub use suggest::{default_keys, suggest, JoinSuggestion};

/// What the user asked the report to show. The report itself is rebuilt from
/// this every time one of these settings changes.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct ReportSpec {
    pub table: String,
    pub filter: Option<Filter>,
    pub group_by: Option<String>,
    pub metric: Option<String>,
    pub selected: BTreeSet<usize>,
}

impl ReportSpec {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_owned(),
            ..Self::default()
        }
    }

    /// Group-by and metric, when both are set.
    pub fn grouping(&self) -> Option<(&str, &str)> {
        match (&self.group_by, &self.metric) {
            (Some(group_by), Some(metric)) => Some((group_by.as_str(), metric.as_str())),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub table: Table,
    pub analysis_column: Option<String>,
    pub summary: Option<SelectionSummary>,
    pub warnings: Vec<String>,
}

/// Runs the pipeline for `spec` against the tables in `store`.
pub fn run_report(store: &TableStore, spec: &ReportSpec) -> Result<Report, Error> {
    let source = store
        .get(&spec.table)
        .ok_or_else(|| Error::SchemaError(format!("Table {} does not exist", spec.table)))?;

    let filtered = match &spec.filter {
        Some(Filter { column, allowed }) => filter(source, column, allowed)?,
        None => source.clone(),
    };

    let (displayed, sum_column) = match spec.grouping() {
        Some((group_by, metric)) => (
            group_sum(&filtered, group_by, metric)?,
            Some(sum_column_name(metric)),
        ),
        None => (filtered, None),
    };

    let mut warnings = Vec::new();
    let column = analysis_column(&displayed, spec.metric.as_deref(), sum_column.as_deref());
    let summary = match column {
        Some(index) => summarize(&displayed, index, &spec.selected)?,
        None => {
            if !spec.selected.is_empty() {
                let message = format!("Table {} has no numeric column to analyse", spec.table);
                warn!("{}", message);
                warnings.push(message);
            }
            None
        }
    };

    debug!(table = %spec.table, rows = displayed.len(), "built report");
    Ok(Report {
        analysis_column: column.map(|index| displayed.columns()[index].0.clone()),
        table: displayed,
        summary,
        warnings,
    })
}
