use tracing::info;

use crate::common::{ColumnType, Error, Table, TableInfo, Value};

/// A connector to an enterprise reporting backend that serves named views
/// (CDS views) as tables. Implementations return one row per document with
/// named columns.
pub trait ReportingSource {
    fn fetch(&self, view: &str) -> Result<Table, Error>;
}

/// Stands in for a real backend: every view yields the same three billing
/// documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedCdsSource;

impl ReportingSource for SimulatedCdsSource {
    fn fetch(&self, view: &str) -> Result<Table, Error> {
        let view = view.trim();
        if view.is_empty() {
            return Err(Error::IngestError("A CDS view name is required".into()));
        }
        info!(view, "fetching simulated CDS view");

        let table_info: TableInfo = vec![
            ("BillingDocument".into(), ColumnType::Text),
            ("CustomerID".into(), ColumnType::Text),
            ("Amount".into(), ColumnType::Numeric),
            ("Currency".into(), ColumnType::Text),
        ];
        let relations = [
            ("90001", "C100", 1000, "EUR"),
            ("90002", "C200", 500, "EUR"),
            ("90003", "C100", 750, "USD"),
        ]
        .into_iter()
        .map(|(document, customer, amount, currency)| {
            vec![
                Value::Text(document.into()),
                Value::Text(customer.into()),
                Value::Integer(amount),
                Value::Text(currency.into()),
            ]
        })
        .collect();
        Table::from(view.to_owned(), table_info, relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_view_has_the_billing_shape() {
        let table = SimulatedCdsSource.fetch("I_BillingDocument").unwrap();
        assert_eq!(table.name(), "I_BillingDocument");
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["BillingDocument", "CustomerID", "Amount", "Currency"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_type(2), Some(ColumnType::Numeric));
        assert_eq!(table.rows()[1][0], Value::Text("90002".into()));
    }

    #[test]
    fn blank_view_names_are_rejected() {
        assert!(matches!(SimulatedCdsSource.fetch("  "), Err(Error::IngestError(_))));
    }
}
