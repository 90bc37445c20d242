pub mod common;
pub mod config;
pub mod parser;
pub mod query_engine;
pub mod session;
pub mod sources;
pub mod storage_engine;

pub use common::{ColumnType, Domain, Error, Table, Value};
pub use config::Config;
pub use session::Session;

#[cfg(test)]
pub mod test_utils {
    use super::common::*;

    pub fn int(value: i64) -> Value {
        Value::Integer(value)
    }

    pub fn text(value: &str) -> Value {
        Value::Text(value.to_owned())
    }

    pub fn table_of(columns: &[&str], rows: Vec<Row>) -> Table {
        Table::from_records(
            "test".into(),
            columns.iter().map(|column| column.to_string()).collect(),
            rows,
        )
        .unwrap()
    }

    /// (group, amt): (X, 10), (X, 5), (Y, 7)
    pub fn orders_table() -> Table {
        table_of(
            &["group", "amt"],
            vec![
                vec![text("X"), int(10)],
                vec![text("X"), int(5)],
                vec![text("Y"), int(7)],
            ],
        )
    }
}
