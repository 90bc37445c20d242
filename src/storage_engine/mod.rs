// Rust Builtin Imports

use std::collections::HashMap;

// Third party library imports

use serde::Serialize;
use tracing::info;

// First party library imports

use crate::common::{Domain, Table};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub domain: Domain,
    pub alias: String,
}

// Table and metadata live in one entry so neither can exist without the other.
struct StoredTable {
    table: Table,
    metadata: TableMetadata,
}

/// The tables loaded during one session, keyed by name.
///
/// Listing order is the order names were first stored in; overwriting a name
/// keeps its position.
#[derive(Default)]
pub struct TableStore {
    tables: HashMap<String, StoredTable>,
    order: Vec<String>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `table` under `name`, replacing any previous table and metadata
    /// with that name wholesale.
    pub fn put(&mut self, name: &str, table: Table, domain: Domain, alias: &str) {
        let table = table.renamed(name);
        info!(
            table = name,
            rows = table.len(),
            columns = table.columns().len(),
            %domain,
            "storing table"
        );
        let entry = StoredTable {
            table,
            metadata: TableMetadata {
                domain,
                alias: alias.to_owned(),
            },
        };
        if self.tables.insert(name.to_owned(), entry).is_none() {
            self.order.push(name.to_owned());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name).map(|stored| &stored.table)
    }

    pub fn metadata(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(name).map(|stored| &stored.metadata)
    }

    pub fn list(&self) -> Vec<(&str, &TableMetadata)> {
        self.order
            .iter()
            .filter_map(|name| {
                self.tables
                    .get(name)
                    .map(|stored| (name.as_str(), &stored.metadata))
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
