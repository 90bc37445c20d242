//! One user session: the loaded tables, the current report settings and a
//! handler per command.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::common::response::{Response, TableEntry};
use crate::common::{ColumnType, Domain, Error, Table, Value};
use crate::config::Config;
use crate::parser::Command;
use crate::query_engine::{
    default_keys, distinct_values, export, join, run_report, suggest, Filter, JoinType, ReportSpec,
};
use crate::sources::{default_table_name, load_file, ReportingSource, SimulatedCdsSource};
use crate::storage_engine::TableStore;

pub struct Session {
    store: TableStore,
    report: Option<ReportSpec>,
    config: Config,
    source: Box<dyn ReportingSource>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session::with_source(config, Box::new(SimulatedCdsSource))
    }

    pub fn with_source(config: Config, source: Box<dyn ReportingSource>) -> Self {
        Self {
            store: TableStore::new(),
            report: None,
            config,
            source,
        }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn report_spec(&self) -> Option<&ReportSpec> {
        self.report.as_ref()
    }

    /// Runs one command. A failed command leaves the session as it was.
    pub fn handle(&mut self, command: Command) -> Result<Response, Error> {
        debug!(?command, "handling command");
        match command {
            Command::Load {
                path,
                name,
                domain,
                alias,
            } => self.load(&path, name, domain, alias),
            Command::Connect { view, domain } => self.connect(&view, domain),
            Command::Tables => Ok(self.tables()),
            Command::Show { table, limit } => Ok(Response::Preview {
                table: self.table(&table)?.clone(),
                limit: limit.unwrap_or(self.config.preview_rows),
            }),
            Command::Describe { table } => Ok(Response::Schema(self.table(&table)?.clone())),
            Command::Suggest { left, right } => self.suggest(&left, &right),
            Command::Join {
                left,
                right,
                keys,
                join_type,
                name,
            } => self.join(&left, &right, keys, join_type, name),
            Command::Report { table } => self.update_report_with(ReportSpec::new(&table)),
            Command::Values { column } => {
                let spec = self.current_report()?;
                let values = distinct_values(self.table(&spec.table)?, &column)?;
                Ok(Response::Values { column, values })
            }
            Command::Filter { column, values } => self.filter(column, values),
            Command::ClearFilter => self.update_report(|spec| {
                spec.filter = None;
                spec.selected.clear();
            }),
            Command::Group { by, metric } => self.update_report(|spec| {
                spec.group_by = Some(by);
                if metric.is_some() {
                    spec.metric = metric;
                }
                spec.selected.clear();
            }),
            Command::ClearGroup => self.update_report(|spec| {
                spec.group_by = None;
                spec.selected.clear();
            }),
            Command::Metric(metric) => self.update_report(|spec| {
                spec.metric = metric;
                spec.selected.clear();
            }),
            Command::Select(rows) => self.update_report(|spec| spec.selected = rows),
            Command::Export { path } => {
                let path = path.unwrap_or_else(|| self.config.export_path.clone());
                self.export(path)
            }
            Command::Help => Ok(Response::Help),
            Command::Quit => Ok(Response::Quit),
        }
    }

    fn table(&self, name: &str) -> Result<&Table, Error> {
        self.store
            .get(name)
            .ok_or_else(|| Error::SchemaError(format!("Table {} does not exist", name)))
    }

    fn current_report(&self) -> Result<&ReportSpec, Error> {
        self.report.as_ref().ok_or_else(|| {
            Error::SchemaError("No report table chosen yet. Use report <table> or join".into())
        })
    }

    fn store_table(&mut self, name: &str, table: Table, domain: Domain, alias: &str) -> Response {
        let response = Response::Stored {
            name: name.to_owned(),
            rows: table.len(),
            columns: table.columns().len(),
        };
        self.store.put(name, table, domain, alias);
        // Row numbers picked on the old table mean nothing on the new one.
        if let Some(spec) = self.report.as_mut().filter(|spec| spec.table == name) {
            spec.selected.clear();
        }
        response
    }

    fn load(
        &mut self,
        path: &Path,
        name: Option<String>,
        domain: Option<Domain>,
        alias: Option<String>,
    ) -> Result<Response, Error> {
        let name = name.unwrap_or_else(|| default_table_name(path));
        let table = load_file(path, &name)?;
        let alias = alias.unwrap_or_else(|| name.clone());
        let domain = domain.unwrap_or(self.config.default_file_domain);
        Ok(self.store_table(&name, table, domain, &alias))
    }

    fn connect(&mut self, view: &str, domain: Option<Domain>) -> Result<Response, Error> {
        let table = self.source.fetch(view)?;
        let domain = domain.unwrap_or(self.config.default_view_domain);
        Ok(self.store_table(view, table, domain, view))
    }

    fn tables(&self) -> Response {
        let entries = self
            .store
            .list()
            .into_iter()
            .map(|(name, metadata)| TableEntry {
                name: name.to_owned(),
                metadata: metadata.clone(),
                rows: self.store.get(name).map_or(0, Table::len),
            })
            .collect();
        Response::Tables(entries)
    }

    fn suggest(&self, left: &str, right: &str) -> Result<Response, Error> {
        let (left_table, right_table) = (self.table(left)?, self.table(right)?);
        Ok(Response::Suggestions {
            left: left.to_owned(),
            right: right.to_owned(),
            suggestions: suggest(left_table, right_table),
            default_keys: default_keys(left_table, right_table),
        })
    }

    fn join(
        &mut self,
        left: &str,
        right: &str,
        keys: Option<(String, String)>,
        join_type: JoinType,
        name: Option<String>,
    ) -> Result<Response, Error> {
        let (left_table, right_table) = (self.table(left)?, self.table(right)?);
        let (left_key, right_key) = match keys {
            Some(keys) => keys,
            None => default_keys(left_table, right_table).ok_or_else(|| {
                Error::JoinError(format!("{} or {} has no columns to join on", left, right))
            })?,
        };
        let joined = join(left_table, right_table, &left_key, &right_key, join_type)?;

        let name = name.unwrap_or_else(|| self.config.join_result_name.clone());
        let domain = self
            .store
            .metadata(left)
            .map_or(self.config.default_file_domain, |metadata| metadata.domain);
        let rows = joined.len();
        self.store.put(&name, joined, domain, &name);
        self.report = Some(ReportSpec::new(&name));
        info!(result = %name, "join result is the report table");

        Ok(Response::Joined {
            name,
            join_type,
            left_key,
            right_key,
            rows,
        })
    }

    fn filter(&mut self, column: String, values: Vec<String>) -> Result<Response, Error> {
        let spec = self.current_report()?;
        let source = self.table(&spec.table)?;
        let index = source.require_column(&column)?;
        // No values means every value, like a fresh multi-select.
        let allowed = if values.is_empty() {
            distinct_values(source, &column)?
        } else {
            let column_type = source.column_type(index).unwrap_or(ColumnType::Other);
            values
                .iter()
                .map(|raw| Value::coerce(raw, column_type))
                .collect()
        };
        self.update_report(|spec| {
            spec.filter = Some(Filter { column, allowed });
            spec.selected.clear();
        })
    }

    fn update_report(&mut self, change: impl FnOnce(&mut ReportSpec)) -> Result<Response, Error> {
        let mut candidate = self.current_report()?.clone();
        change(&mut candidate);
        self.update_report_with(candidate)
    }

    // The settings are only kept when the report they describe can be built.
    fn update_report_with(&mut self, candidate: ReportSpec) -> Result<Response, Error> {
        let report = run_report(&self.store, &candidate)?;
        self.report = Some(candidate);
        Ok(Response::Report {
            report,
            limit: self.config.preview_rows,
        })
    }

    fn export(&self, path: PathBuf) -> Result<Response, Error> {
        // The selection only feeds the drill-down, never the exported rows.
        let mut spec = self.current_report()?.clone();
        spec.selected.clear();
        let report = run_report(&self.store, &spec)?;
        let bytes = export(&report.table, &path)?;
        Ok(Response::Exported {
            path,
            rows: report.table.len(),
            bytes,
        })
    }
}
