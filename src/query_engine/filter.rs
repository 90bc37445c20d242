use std::collections::HashSet;

use serde::Serialize;

use crate::common::{Error, Table, Value, ValueKey};

/// Keep rows whose `column` holds one of `allowed`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub allowed: Vec<Value>,
}

pub fn filter(table: &Table, column: &str, allowed: &[Value]) -> Result<Table, Error> {
    let index = table.require_column(column)?;
    let keep_null = allowed.iter().any(Value::is_null);
    let allowed: HashSet<ValueKey> = allowed.iter().filter_map(Value::key).collect();

    let relations = table
        .rows()
        .iter()
        .filter(|row| match row[index].key() {
            Some(key) => allowed.contains(&key),
            None => keep_null,
        })
        .cloned()
        .collect();
    Table::from(table.name().to_owned(), table.columns().to_vec(), relations)
}

/// The distinct values of `column` in the order they first appear.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<Value>, Error> {
    let index = table.require_column(column)?;
    let mut seen = HashSet::new();
    let mut seen_null = false;
    let mut values = Vec::new();
    for value in table.column_values(index) {
        let first = match value.key() {
            Some(key) => seen.insert(key),
            None => !std::mem::replace(&mut seen_null, true),
        };
        if first {
            values.push(value.clone());
        }
    }
    Ok(values)
}
