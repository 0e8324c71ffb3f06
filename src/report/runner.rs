//! Running reports against a store.

use tracing::{debug, info};

use super::catalog::{self, BEFORE};
use super::params::ReportParams;
use super::result::ResultSet;
use super::ReportError;
use crate::plan::{Params, ReportPlan, Row, Value};
use crate::schema::index_specs;
use crate::store::{Store, StoreResult};

/// Provision a lookup index on every key column.
pub fn before<S: Store + ?Sized>(store: &mut S) -> StoreResult<()> {
    let specs = index_specs();
    store.ensure_indexes(&specs)?;
    info!(backend = store.backend(), indexes = specs.len(), "before complete");
    Ok(())
}

/// A store that has been through `before`, plus the report parameters.
pub struct ReportRunner<S> {
    store: S,
    params: ReportParams,
}

impl<S: Store> ReportRunner<S> {
    /// Run `before` once and take ownership of the store.
    pub fn prepare(mut store: S, params: ReportParams) -> Result<Self, ReportError> {
        before(&mut store)?;
        Ok(Self { store, params })
    }

    pub fn params(&self) -> &ReportParams {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a registered report by id.
    pub fn run(&self, id: &str) -> Result<ResultSet, ReportError> {
        let def = catalog::find(id).ok_or_else(|| ReportError::UnknownReport(id.to_string()))?;
        self.run_plan(&def.plan(&self.params))
    }

    /// Run every registered report in registry order.
    pub fn run_all(&self) -> Result<Vec<ResultSet>, ReportError> {
        catalog::reports()
            .iter()
            .map(|def| self.run_plan(&def.plan(&self.params)))
            .collect()
    }

    /// Invoke a registry entry by name. `before` provisions indexes again
    /// and yields no rows.
    pub fn invoke(&mut self, name: &str) -> Result<Option<ResultSet>, ReportError> {
        if name == BEFORE {
            before(&mut self.store)?;
            return Ok(None);
        }
        self.run(name).map(Some)
    }

    /// Bind the report's sibling scalars in order, then run its main plan.
    pub fn run_plan(&self, report: &ReportPlan) -> Result<ResultSet, ReportError> {
        let mut params = Params::new();
        for scalar in &report.preludes {
            let rows = self.store.execute(&scalar.plan, &params)?;
            let value = single_value(report.id, &scalar.name, rows)?;
            debug!(report = report.id, scalar = %scalar.name, %value, "bound scalar");
            params.insert(scalar.name.clone(), value);
        }
        let rows = self.store.execute(&report.plan, &params)?;
        info!(report = report.id, rows = rows.len(), "report complete");
        Ok(ResultSet::new(report.id, report.columns.clone(), rows))
    }
}

fn single_value(report: &str, name: &str, rows: Vec<Row>) -> Result<Value, ReportError> {
    let shape_error = |columns: usize, rows: usize| ReportError::ScalarShape {
        report: report.to_string(),
        name: name.to_string(),
        rows,
        columns,
    };
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) if row.len() == 1 => Ok(row
            .iter()
            .next()
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null)),
        (Some(row), n) => Err(shape_error(row.len(), n)),
        (None, _) => Err(shape_error(0, 0)),
    }
}
