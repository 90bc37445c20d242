use std::fmt::Write as _;

use serde::Serialize;

use crate::common::{error::Error, ColumnHeader, ColumnType, Row, TableInfo, Value};

/// A named, in-memory table. Column types are fixed when the table is built;
/// a stage that changes the data builds a new table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    table_info: TableInfo,
    relations: Vec<Row>,
}

impl Table {
    pub fn from(name: String, table_info: TableInfo, relations: Vec<Row>) -> Result<Self, Error> {
        if let Some((index, row)) = relations
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != table_info.len())
        {
            return Err(Error::SchemaError(format!(
                "Row {} of table {} has {} values, expected {}",
                index,
                name,
                row.len(),
                table_info.len()
            )));
        }
        Ok(Self {
            name,
            table_info,
            relations,
        })
    }

    /// Builds a table from column names and rows, inferring each column's type
    /// from its values.
    pub fn from_records(name: String, headers: Vec<String>, relations: Vec<Row>) -> Result<Self, Error> {
        let table_info = headers
            .into_iter()
            .enumerate()
            .map(|(index, header)| {
                let column_type = ColumnType::infer(relations.iter().filter_map(|row| row.get(index)));
                (header, column_type)
            })
            .collect();
        Table::from(name, table_info, relations)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn renamed(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    pub fn columns(&self) -> &[ColumnHeader] {
        &self.table_info
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.table_info.iter().map(|(name, _)| name.as_str())
    }

    pub fn rows(&self) -> &[Row] {
        &self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Position of the first column called `column`.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.table_info.iter().position(|(name, _)| name == column)
    }

    /// Like [`Table::column_index`] but reports a missing column as an error.
    pub fn require_column(&self, column: &str) -> Result<usize, Error> {
        self.column_index(column).ok_or_else(|| {
            Error::SchemaError(format!("Table {} has no column {}", self.name, column))
        })
    }

    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.table_info.get(index).map(|(_, column_type)| *column_type)
    }

    pub fn first_numeric_column(&self) -> Option<usize> {
        self.table_info
            .iter()
            .position(|(_, column_type)| *column_type == ColumnType::Numeric)
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.relations.iter().filter_map(move |row| row.get(index))
    }

    pub fn describe(&self) -> String {
        let mut output = format!("{} ({} rows)\n", self.name, self.relations.len());
        for (column_name, column_type) in &self.table_info {
            let _ = writeln!(output, "  {:<24} {}", column_name, column_type);
        }
        output
    }

    /// Renders up to `limit` rows as an aligned text grid with a leading row
    /// index, which is the index `select` refers to.
    pub fn show(&self, limit: usize) -> String {
        let shown = &self.relations[..self.relations.len().min(limit)];

        let mut widths: Vec<usize> = self.table_info.iter().map(|(name, _)| name.len()).collect();
        let rendered: Vec<Vec<String>> = shown
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect();
        for row in &rendered {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        let index_width = shown.len().saturating_sub(1).to_string().len();

        let mut output = String::new();
        let _ = write!(output, "{:>index_width$}", "");
        for ((name, _), width) in self.table_info.iter().zip(&widths) {
            let _ = write!(output, " | {:<width$}", name);
        }
        output.push('\n');
        for (index, row) in rendered.iter().enumerate() {
            let _ = write!(output, "{:>index_width$}", index);
            for (cell, width) in row.iter().zip(&widths) {
                let _ = write!(output, " | {:<width$}", cell);
            }
            output.push('\n');
        }
        if self.relations.len() > shown.len() {
            let _ = writeln!(output, "... {} more rows", self.relations.len() - shown.len());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_rows() {
        let table_info = vec![("id".to_string(), ColumnType::Numeric)];
        let result = Table::from("t".into(), table_info, vec![vec![Value::Integer(1), Value::Null]]);
        assert!(matches!(result, Err(Error::SchemaError(_))));
    }

    #[test]
    fn infers_types_from_records() {
        let table = Table::from_records(
            "t".into(),
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::Integer(1), Value::Text("a".into())],
                vec![Value::Float(2.5), Value::Null],
            ],
        )
        .unwrap();
        assert_eq!(table.column_type(0), Some(ColumnType::Numeric));
        assert_eq!(table.column_type(1), Some(ColumnType::Text));
        assert_eq!(table.first_numeric_column(), Some(0));
    }

    #[test]
    fn show_truncates_and_indexes_rows() {
        let table = Table::from_records(
            "t".into(),
            vec!["n".into()],
            (0..3).map(|n| vec![Value::Integer(n)]).collect(),
        )
        .unwrap();
        let output = table.show(2);
        assert!(output.contains("0 | 0"));
        assert!(output.contains("1 | 1"));
        assert!(output.contains("... 1 more rows"));
    }
}
