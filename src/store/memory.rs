//! In-memory reference store.
//!
//! Executes plans step by step over rows loaded from a [`Dataset`]. Lookups
//! use the hash indexes built by `ensure_indexes`; a lookup on a column
//! without an index builds a transient one for that step.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use super::eval::{self, accumulate, mean, passes};
use super::{Store, StoreError, StoreResult};
use crate::plan::{Aggregate, Expr, JoinKind, Params, Plan, Row, SortKey, Step, Value};
use crate::schema::{Dataset, Entity, IndexSpec};

/// Hashable form of a join key. Missing values have no key and never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl IndexKey {
    fn of(value: &Value) -> Option<IndexKey> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            v @ (Value::Int(_) | Value::Decimal(_)) => match v.as_i64() {
                Some(n) => Some(IndexKey::Int(n)),
                None => Some(IndexKey::Text(v.to_string())),
            },
            Value::Text(s) => Some(IndexKey::Text(s.clone())),
            Value::DateTime(dt) => Some(IndexKey::Text(dt.to_string())),
        }
    }
}

type HashIndex = HashMap<IndexKey, Vec<usize>>;

fn build_index(rows: &[Row], column: &str) -> HashIndex {
    let mut index = HashIndex::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(key) = row.get(column).and_then(IndexKey::of) {
            index.entry(key).or_default().push(i);
        }
    }
    index
}

/// Group keys ordered by the value total order, so groups come out sorted.
#[derive(Debug, Clone)]
struct GroupKey(Vec<Value>);

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

/// Reference store holding every entity in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<Entity, Vec<Row>>,
    indexes: HashMap<(Entity, String), HashIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut store = Self::new();
        for entity in Entity::ALL {
            store.tables.insert(entity, dataset.rows(entity));
        }
        store
    }

    /// Replace the rows of one entity. Drops that entity's indexes.
    pub fn load(&mut self, entity: Entity, rows: Vec<Row>) {
        self.indexes.retain(|(e, _), _| *e != entity);
        self.tables.insert(entity, rows);
    }

    pub fn has_index(&self, entity: Entity, column: &str) -> bool {
        self.indexes.contains_key(&(entity, column.to_string()))
    }

    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    fn rows(&self, entity: Entity) -> &[Row] {
        self.tables.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    fn lookup(
        &self,
        rows: Vec<Row>,
        from: Entity,
        local: &str,
        foreign: &str,
        alias: &str,
        kind: JoinKind,
    ) -> Vec<Row> {
        let others = self.rows(from);
        let transient;
        let index = match self.indexes.get(&(from, foreign.to_string())) {
            Some(index) => index,
            None => {
                debug!(entity = %from, column = foreign, "lookup without index, hashing on the fly");
                transient = build_index(others, foreign);
                &transient
            }
        };

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let matches = row
                .get(local)
                .and_then(IndexKey::of)
                .and_then(|key| index.get(&key));
            match matches {
                Some(positions) => {
                    for &i in positions {
                        let mut joined = row.clone();
                        for (column, value) in others[i].iter() {
                            joined.insert(format!("{}.{}", alias, column), value.clone());
                        }
                        out.push(joined);
                    }
                }
                None if kind == JoinKind::Left => out.push(row),
                None => {}
            }
        }
        out
    }

    fn group(
        rows: Vec<Row>,
        keys: &[(String, Expr)],
        aggregates: &[(String, Aggregate)],
        params: &Params,
    ) -> StoreResult<Vec<Row>> {
        let mut groups: BTreeMap<GroupKey, Vec<Row>> = BTreeMap::new();
        if keys.is_empty() {
            groups.insert(GroupKey(Vec::new()), rows);
        } else {
            for row in rows {
                let key = keys
                    .iter()
                    .map(|(_, e)| eval::eval(e, &row, params))
                    .collect::<StoreResult<Vec<_>>>()?;
                groups.entry(GroupKey(key)).or_default().push(row);
            }
        }

        let mut out = Vec::with_capacity(groups.len());
        for (GroupKey(key_values), members) in groups {
            let mut row = Row::new();
            for ((name, _), value) in keys.iter().zip(key_values) {
                row.insert(name.clone(), value);
            }
            for (name, agg) in aggregates {
                row.insert(name.clone(), aggregate(agg, &members, params)?);
            }
            out.push(row);
        }
        Ok(out)
    }
}

fn aggregate(agg: &Aggregate, rows: &[Row], params: &Params) -> StoreResult<Value> {
    match agg {
        Aggregate::Count => Ok(Value::Int(rows.len() as i64)),
        Aggregate::CountIf(predicate) => {
            let mut n = 0i64;
            for row in rows {
                if passes(predicate, row, params)? {
                    n += 1;
                }
            }
            Ok(Value::Int(n))
        }
        Aggregate::Sum(e) => {
            let mut sum = Value::Int(0);
            for row in rows {
                sum = accumulate(sum, &eval::eval(e, row, params)?)?;
            }
            Ok(sum)
        }
        Aggregate::Avg(e) => {
            let mut sum = Value::Int(0);
            let mut n = 0usize;
            for row in rows {
                let v = eval::eval(e, row, params)?;
                if !v.is_null() {
                    sum = accumulate(sum, &v)?;
                    n += 1;
                }
            }
            Ok(mean(&sum, n))
        }
        Aggregate::Max(e) => {
            let mut best = Value::Null;
            for row in rows {
                let v = eval::eval(e, row, params)?;
                if !v.is_null() && (best.is_null() || v.total_cmp(&best) == Ordering::Greater) {
                    best = v;
                }
            }
            Ok(best)
        }
    }
}

fn compare_rows(a: &Row, b: &Row, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ord = a.value(&key.field).total_cmp(&b.value(&key.field));
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn ensure_indexes(&mut self, specs: &[IndexSpec]) -> StoreResult<()> {
        let mut built = 0;
        for spec in specs {
            if !spec.entity.has_column(spec.column) {
                return Err(StoreError::UnknownColumn {
                    entity: spec.entity,
                    column: spec.column.to_string(),
                });
            }
            let slot = (spec.entity, spec.column.to_string());
            if self.indexes.contains_key(&slot) {
                continue;
            }
            let index = build_index(self.rows(spec.entity), spec.column);
            debug!(index = %spec.name(), keys = index.len(), "index built");
            self.indexes.insert(slot, index);
            built += 1;
        }
        info!(built, total = self.indexes.len(), "indexes ready");
        Ok(())
    }

    fn execute(&self, plan: &Plan, params: &Params) -> StoreResult<Vec<Row>> {
        let mut rows: Vec<Row> = self.rows(plan.source).to_vec();
        debug!(source = %plan.source, rows = rows.len(), steps = plan.steps.len(), "executing plan");

        for step in &plan.steps {
            rows = match step {
                Step::Lookup {
                    from,
                    local,
                    foreign,
                    alias,
                    kind,
                } => self.lookup(rows, *from, local, foreign, alias, *kind),

                Step::Filter(predicate) => {
                    let mut kept = Vec::with_capacity(rows.len());
                    for row in rows {
                        if passes(predicate, &row, params)? {
                            kept.push(row);
                        }
                    }
                    kept
                }

                Step::Group { keys, aggregates } => Self::group(rows, keys, aggregates, params)?,

                Step::Project(columns) => rows
                    .iter()
                    .map(|row| {
                        let mut out = Row::new();
                        for (name, e) in columns {
                            out.insert(name.clone(), eval::eval(e, row, params)?);
                        }
                        Ok(out)
                    })
                    .collect::<StoreResult<Vec<_>>>()?,

                Step::Sort(keys) => {
                    rows.sort_by(|a, b| compare_rows(a, b, keys));
                    rows
                }

                Step::Limit(n) => {
                    rows.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
                    rows
                }

                Step::FirstPerGroup { partition, order } => {
                    rows.sort_by(|a, b| compare_rows(a, b, order));
                    let mut seen = BTreeSet::new();
                    rows.into_iter()
                        .filter(|row| {
                            let key = GroupKey(partition.iter().map(|f| row.value(f)).collect());
                            seen.insert(key)
                        })
                        .collect()
                }
            };
        }

        Ok(rows)
    }
}
