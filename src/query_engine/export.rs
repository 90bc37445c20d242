use std::fs;
use std::path::Path;

use tracing::info;

use crate::common::{Error, Table, Value};

/// Serializes `table` as comma separated UTF-8 text with a header row and no
/// index column. Nulls become empty fields.
pub fn to_csv(table: &Table) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(field))?;
    }
    writer
        .into_inner()
        .map_err(|err| Error::IOError(err.into_error()))
}

// Floats keep a fractional part so the column reads back as floats.
fn field(value: &Value) -> String {
    match value {
        Value::Float(float) => format!("{:?}", float),
        other => other.to_string(),
    }
}

/// Writes [`to_csv`] output to `path` and returns the number of bytes written.
pub fn export(table: &Table, path: &Path) -> Result<usize, Error> {
    let bytes = to_csv(table)?;
    fs::write(path, &bytes)?;
    info!(table = table.name(), path = %path.display(), rows = table.len(), "exported report");
    Ok(bytes.len())
}
