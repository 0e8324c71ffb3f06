//! Aggregation-pipeline generation for the document engine.
//!
//! - [`pipeline`] - plan steps → stages
//! - [`expr`] - plan expressions → aggregation expressions
//!
//! A report becomes a [`DocumentScript`]: one aggregate command per sibling
//! scalar, each binding a variable, then the main command which reads those
//! variables as `$$name` through the `let` option.

pub mod expr;
pub mod pipeline;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value as Json};
use tracing::debug;

use crate::plan::{Params, Plan, ReportPlan};
use crate::schema::{index_specs, Entity};

pub use pipeline::render_stages;

/// Error type for building engine commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
}

/// One `aggregate` command against a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCommand {
    pub collection: &'static str,
    pub pipeline: Vec<Json>,
    /// Variables the pipeline reads as `$$name`.
    pub variables: Vec<String>,
}

impl AggregateCommand {
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            collection: plan.source.collection_name(),
            pipeline: render_stages(plan),
            variables: plan.params().into_iter().map(String::from).collect(),
        }
    }

    /// The wire command, with each variable bound from `params`.
    pub fn to_command(&self, params: &Params) -> Result<Json, CommandError> {
        let mut bound = serde_json::Map::new();
        for name in &self.variables {
            let value = params
                .get(name)
                .ok_or_else(|| CommandError::UnboundVariable(name.clone()))?;
            bound.insert(name.clone(), expr::literal(value));
        }
        let mut command = json!({
            "aggregate": self.collection,
            "pipeline": self.pipeline,
            "cursor": {},
        });
        if !bound.is_empty() {
            command["let"] = Json::Object(bound);
        }
        Ok(command)
    }
}

/// A command whose single result value is bound as `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prelude {
    pub name: String,
    pub command: AggregateCommand,
}

/// Everything needed to run one report on the document engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentScript {
    pub report: &'static str,
    pub preludes: Vec<Prelude>,
    pub main: AggregateCommand,
}

/// Render a report as prelude commands plus the main command.
pub fn render_report(report: &ReportPlan) -> DocumentScript {
    let preludes: Vec<Prelude> = report
        .preludes
        .iter()
        .map(|scalar| Prelude {
            name: scalar.name.clone(),
            command: AggregateCommand::from_plan(&scalar.plan),
        })
        .collect();
    let main = AggregateCommand::from_plan(&report.plan);
    debug!(
        report = report.id,
        preludes = preludes.len(),
        stages = main.pipeline.len(),
        "rendered pipeline"
    );
    DocumentScript {
        report: report.id,
        preludes,
        main,
    }
}

/// The `before` commands: one `createIndexes` per collection with key columns.
pub fn render_setup() -> Vec<Json> {
    let mut by_collection: BTreeMap<Entity, Vec<Json>> = BTreeMap::new();
    for spec in index_specs() {
        by_collection
            .entry(spec.entity)
            .or_default()
            .push(json!({ "key": { (spec.column): 1 }, "name": spec.name() }));
    }
    by_collection
        .into_iter()
        .map(|(entity, indexes)| {
            json!({ "createIndexes": entity.collection_name(), "indexes": indexes })
        })
        .collect()
}
