//! Where tables come from: uploaded files and the enterprise view connector.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::common::{Error, Table};

pub mod cds;
pub mod delimited;
pub mod spreadsheet;

pub use cds::{ReportingSource, SimulatedCdsSource};

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Loads a CSV file or the first sheet of a workbook, chosen by extension.
pub fn load_file(path: &Path, name: &str) -> Result<Table, Error> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = if extension == "csv" {
        delimited::read_csv(BufReader::new(File::open(path)?), name)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        spreadsheet::read_first_sheet(path, name)?
    } else {
        return Err(Error::IngestError(format!(
            "Unsupported file type for {}, expected .csv or a spreadsheet",
            path.display()
        )));
    };

    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded file"
    );
    Ok(table)
}

/// Table name used when the user gives none: the file name without extension.
pub fn default_table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("table")
        .to_owned()
}
