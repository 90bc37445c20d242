use std::io::Read;

use crate::common::{Error, Row, Table, Value};

/// Reads comma separated text with a header row. Each cell is typed on its
/// own; column types follow from the cells.
pub fn read_csv<R: Read>(reader: R, name: &str) -> Result<Table, Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if headers.is_empty() {
        return Err(Error::IngestError(format!("{} has no header row", name)));
    }

    let mut relations: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record?;
        relations.push(record.iter().map(Value::infer).collect());
    }
    Table::from_records(name.to_owned(), headers, relations)
}
