use std::collections::BTreeMap;

use tracing::debug;

use crate::common::{ColumnType, Error, Table, Value, ValueKey};

pub const SUM_SUFFIX: &str = "_sum";

/// Name of the column `group_sum` writes the totals of `metric` into.
pub fn sum_column_name(metric: &str) -> String {
    format!("{}{}", metric, SUM_SUFFIX)
}

// Integers stay integers until a float shows up.
#[derive(Clone, Copy)]
enum Total {
    Integer(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: &Value) -> Self {
        match (self, value) {
            (Total::Integer(total), Value::Integer(int)) => match total.checked_add(*int) {
                Some(sum) => Total::Integer(sum),
                None => Total::Float(total as f64 + *int as f64),
            },
            (total, value) => match value.as_f64() {
                Some(number) => Total::Float(total.as_f64() + number),
                None => total,
            },
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Total::Integer(int) => int as f64,
            Total::Float(float) => float,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Total::Integer(int) => Value::Integer(int),
            Total::Float(float) => Value::Float(float),
        }
    }
}

/// Partitions rows by `group_by` and sums `metric` within each partition.
///
/// One output row per distinct non-null group value, in ascending group
/// order, with columns `[group_by, <metric>_sum]`. Null metrics are skipped.
pub fn group_sum(table: &Table, group_by: &str, metric: &str) -> Result<Table, Error> {
    let group_index = table.require_column(group_by)?;
    let metric_index = table.require_column(metric)?;
    if table.column_type(metric_index) != Some(ColumnType::Numeric) {
        return Err(Error::AnalysisError(format!(
            "Column {} is not numeric and cannot be summed",
            metric
        )));
    }

    let mut groups: BTreeMap<ValueKey, (Value, Total)> = BTreeMap::new();
    for row in table.rows() {
        let group = &row[group_index];
        let Some(key) = group.key() else {
            continue;
        };
        let (_, total) = groups
            .entry(key)
            .or_insert_with(|| (group.clone(), Total::Integer(0)));
        *total = total.add(&row[metric_index]);
    }
    debug!(table = table.name(), group_by, metric, groups = groups.len(), "grouped rows");

    let group_type = table.column_type(group_index).unwrap_or(ColumnType::Other);
    let table_info = vec![
        (group_by.to_owned(), group_type),
        (sum_column_name(metric), ColumnType::Numeric),
    ];
    let relations = groups
        .into_values()
        .map(|(group, total)| vec![group, total.into_value()])
        .collect();
    Table::from(table.name().to_owned(), table_info, relations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{int, orders_table, table_of, text};

    #[test]
    fn sums_each_group() {
        let grouped = group_sum(&orders_table(), "group", "amt").unwrap();
        assert_eq!(grouped.column_names().collect::<Vec<_>>(), vec!["group", "amt_sum"]);
        assert_eq!(
            grouped.rows(),
            &[vec![text("X"), int(15)], vec![text("Y"), int(7)]]
        );
        assert_eq!(grouped.column_type(1), Some(ColumnType::Numeric));
    }

    #[test]
    fn skips_null_groups_and_null_metrics() {
        let table = table_of(
            &["g", "m"],
            vec![
                vec![text("a"), Value::Float(1.5)],
                vec![text("a"), Value::Null],
                vec![Value::Null, int(100)],
                vec![text("b"), int(2)],
            ],
        );
        let grouped = group_sum(&table, "g", "m").unwrap();
        assert_eq!(
            grouped.rows(),
            &[vec![text("a"), Value::Float(1.5)], vec![text("b"), int(2)]]
        );
    }

    #[test]
    fn refuses_non_numeric_metrics() {
        assert!(matches!(
            group_sum(&orders_table(), "amt", "group"),
            Err(Error::AnalysisError(_))
        ));
    }
}
