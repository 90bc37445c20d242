use std::collections::BTreeSet;

use serde::Serialize;

use crate::common::{ColumnType, Error, Table};

/// Drill-down figures for the rows picked out of the displayed report.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SelectionSummary {
    pub column: String,
    pub rows: usize,
    pub sum: f64,
    pub mean: f64,
    pub total: f64,
    pub percent_of_total: f64,
}

/// Picks the column the drill-down is computed on: the summed column of a
/// grouped report, else the metric column, else the first numeric column.
pub fn analysis_column(table: &Table, metric: Option<&str>, sum_column: Option<&str>) -> Option<usize> {
    let numeric = |name: &str| {
        table
            .column_index(name)
            .filter(|index| table.column_type(*index) == Some(ColumnType::Numeric))
    };
    sum_column
        .and_then(numeric)
        .or_else(|| metric.and_then(numeric))
        .or_else(|| table.first_numeric_column())
}

/// Sum, mean and share of the report total for the `selected` rows of
/// `column`. An empty selection yields `None`.
pub fn summarize(
    table: &Table,
    column: usize,
    selected: &BTreeSet<usize>,
) -> Result<Option<SelectionSummary>, Error> {
    if selected.is_empty() {
        return Ok(None);
    }
    if let Some(&out_of_range) = selected.iter().find(|&&index| index >= table.len()) {
        return Err(Error::AnalysisError(format!(
            "Row {} is not in the report, which has {} rows",
            out_of_range,
            table.len()
        )));
    }
    let name = table
        .columns()
        .get(column)
        .map(|(name, _)| name.clone())
        .ok_or_else(|| Error::AnalysisError(format!("No column at position {}", column)))?;

    let total: f64 = table.column_values(column).filter_map(|value| value.as_f64()).sum();
    let picked: Vec<f64> = selected
        .iter()
        .filter_map(|&index| table.rows()[index][column].as_f64())
        .collect();
    let sum: f64 = picked.iter().sum();
    let mean = if picked.is_empty() {
        0.0
    } else {
        sum / picked.len() as f64
    };
    let percent_of_total = if total == 0.0 { 0.0 } else { sum / total * 100.0 };

    Ok(Some(SelectionSummary {
        column: name,
        rows: selected.len(),
        sum,
        mean,
        total,
        percent_of_total,
    }))
}
