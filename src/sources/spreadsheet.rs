use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::common::{Error, Row, Table, Value};

/// Reads the first worksheet of a workbook. The first row holds the column
/// names.
pub fn read_first_sheet(path: &Path, name: &str) -> Result<Table, Error> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::IngestError(format!("{} has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(index, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", index),
                other => other.to_string(),
            })
            .collect(),
        None => {
            return Err(Error::IngestError(format!(
                "The first sheet of {} is empty",
                path.display()
            )))
        }
    };

    let relations: Vec<Row> = rows.map(|row| row.iter().map(cell_value).collect()).collect();
    Table::from_records(name.to_owned(), headers, relations)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(int) => Value::Integer(*int),
        Data::Float(float) => Value::Float(*float),
        Data::Bool(flag) => Value::Boolean(*flag),
        Data::String(text) if text.is_empty() => Value::Null,
        Data::String(text) => Value::Text(text.clone()),
        // Dates and durations are kept as their text rendering
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cells() {
        assert_eq!(cell_value(&Data::Int(3)), Value::Integer(3));
        assert_eq!(cell_value(&Data::Float(1.5)), Value::Float(1.5));
        assert_eq!(cell_value(&Data::String("EUR".into())), Value::Text("EUR".into()));
        assert_eq!(cell_value(&Data::Empty), Value::Null);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        assert!(read_first_sheet(Path::new("does/not/exist.xlsx"), "x").is_err());
    }
}
