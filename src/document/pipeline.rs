//! Plan steps as aggregation stages.

use serde_json::{json, Map, Value as Json};

use super::expr::{field_path, render_accumulator, render_expr};
use crate::plan::{Expr, JoinKind, Plan, SortKey, Step};

/// Build the stages for a plan.
pub fn render_stages(plan: &Plan) -> Vec<Json> {
    let mut builder = StageBuilder::default();
    for step in &plan.steps {
        builder.step(step);
    }
    builder.stages
}

#[derive(Default)]
struct StageBuilder {
    stages: Vec<Json>,
    /// Sort keys the current document order follows. `$sort` is not stable,
    /// so a later sort repeats these as tie-breakers.
    order: Vec<SortKey>,
}

impl StageBuilder {
    fn step(&mut self, step: &Step) {
        match step {
            Step::Lookup {
                from,
                local,
                foreign,
                alias,
                kind,
            } => {
                self.stages.push(json!({
                    "$lookup": {
                        "from": from.collection_name(),
                        "localField": local,
                        "foreignField": foreign,
                        "as": alias,
                    }
                }));
                self.stages.push(json!({
                    "$unwind": {
                        "path": format!("${}", alias),
                        "preserveNullAndEmptyArrays": *kind == JoinKind::Left,
                    }
                }));
            }
            Step::Filter(predicate) => {
                self.stages
                    .push(json!({ "$match": { "$expr": render_expr(predicate) } }));
            }
            Step::Group { keys, aggregates } if keys.is_empty() => {
                let mut group = Map::new();
                group.insert("_id".into(), Json::Null);
                let mut shape = Map::new();
                shape.insert("_id".into(), json!(0));
                let mut defaults = Map::new();
                for (i, (name, aggregate)) in aggregates.iter().enumerate() {
                    let slot = format!("a{}", i);
                    shape.insert(name.clone(), field_path(&slot));
                    group.insert(slot, render_accumulator(aggregate));
                    let default = if aggregate.is_zero_on_empty() {
                        json!(0)
                    } else {
                        Json::Null
                    };
                    defaults.insert(name.clone(), default);
                }
                self.stages.push(json!({
                    "$facet": { "rows": [{ "$group": group }, { "$project": shape }] }
                }));
                self.stages.push(json!({
                    "$replaceRoot": {
                        "newRoot": { "$ifNull": [{ "$arrayElemAt": ["$rows", 0] }, defaults] }
                    }
                }));
                self.order.clear();
            }
            Step::Group { keys, aggregates } => {
                let mut id = Map::new();
                let mut shape = Map::new();
                shape.insert("_id".into(), json!(0));
                for (i, (name, expr)) in keys.iter().enumerate() {
                    let slot = format!("k{}", i);
                    shape.insert(name.clone(), field_path(&format!("_id.{}", slot)));
                    id.insert(slot, render_expr(expr));
                }
                let mut group = Map::new();
                group.insert("_id".into(), Json::Object(id));
                for (i, (name, aggregate)) in aggregates.iter().enumerate() {
                    let slot = format!("a{}", i);
                    shape.insert(name.clone(), field_path(&slot));
                    group.insert(slot, render_accumulator(aggregate));
                }
                self.stages.push(json!({ "$group": group }));
                self.stages.push(json!({ "$project": shape }));
                self.order.clear();
            }
            Step::Project(columns) => {
                let mut shape = Map::new();
                shape.insert("_id".into(), json!(0));
                for (name, expr) in columns {
                    let value = match expr {
                        // a bare 1 or true would read as "include this field"
                        Expr::Literal(v) => json!({ "$literal": v }),
                        other => render_expr(other),
                    };
                    shape.insert(name.clone(), value);
                }
                self.stages.push(json!({ "$project": shape }));
                let kept = self
                    .order
                    .iter()
                    .take_while(|key| {
                        columns
                            .iter()
                            .any(|(name, e)| name == &key.field && *e == Expr::Field(key.field.clone()))
                    })
                    .count();
                self.order.truncate(kept);
            }
            Step::Sort(keys) => {
                let keys = self.with_tie_breakers(keys);
                self.stages.push(sort_stage(&keys));
                self.order = keys;
            }
            Step::Limit(0) => {
                self.stages.push(json!({ "$match": { "$expr": false } }));
            }
            Step::Limit(n) => {
                self.stages.push(json!({ "$limit": n }));
            }
            Step::FirstPerGroup { partition, order } => {
                let keys = self.with_tie_breakers(order);
                self.stages.push(sort_stage(&keys));
                let id: Map<String, Json> = partition
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (format!("p{}", i), field_path(name)))
                    .collect();
                self.stages.push(json!({
                    "$group": { "_id": id, "row": { "$first": "$$ROOT" } }
                }));
                self.stages
                    .push(json!({ "$replaceRoot": { "newRoot": "$row" } }));
                self.order.clear();
            }
        }
    }

    fn with_tie_breakers(&self, keys: &[SortKey]) -> Vec<SortKey> {
        let mut out = keys.to_vec();
        for key in &self.order {
            if !out.iter().any(|k| k.field == key.field) {
                out.push(key.clone());
            }
        }
        out
    }
}

fn sort_stage(keys: &[SortKey]) -> Json {
    let spec: Map<String, Json> = keys
        .iter()
        .map(|k| (k.field.clone(), json!(if k.descending { -1 } else { 1 })))
        .collect();
    json!({ "$sort": spec })
}
