//! Plan steps and the plan builder.

use super::expr::Expr;
use crate::schema::Entity;

/// How a lookup treats rows without a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Drop rows with no match.
    Inner,
    /// Keep rows with no match; the joined fields read as missing.
    Left,
}

/// Aggregate functions available to a group step.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Number of rows in the group.
    Count,
    /// Number of rows for which the predicate holds.
    CountIf(Expr),
    /// Sum of non-missing values; 0 when there are none.
    Sum(Expr),
    /// Mean of non-missing values; missing when there are none.
    Avg(Expr),
    /// Largest non-missing value; missing when there are none.
    Max(Expr),
}

impl Aggregate {
    /// Value produced for a group with no rows.
    pub fn is_zero_on_empty(&self) -> bool {
        matches!(
            self,
            Aggregate::Count | Aggregate::CountIf(_) | Aggregate::Sum(_)
        )
    }

    pub fn input(&self) -> Option<&Expr> {
        match self {
            Aggregate::Count => None,
            Aggregate::CountIf(e) | Aggregate::Sum(e) | Aggregate::Avg(e) | Aggregate::Max(e) => {
                Some(e)
            }
        }
    }
}

/// A sort key over a field of the current row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// One step of a plan. Steps apply in order to the rows produced so far.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Equi-join each row with rows of `from` where `row[local] == other[foreign]`.
    /// One output row per match; joined fields land under `alias.Column`.
    Lookup {
        from: Entity,
        local: String,
        foreign: String,
        alias: String,
        kind: JoinKind,
    },

    Filter(Expr),

    /// Group by named key expressions. Output rows hold the keys then the
    /// aggregates. With no keys, exactly one row is produced.
    Group {
        keys: Vec<(String, Expr)>,
        aggregates: Vec<(String, Aggregate)>,
    },

    /// Replace each row by the named expressions.
    Project(Vec<(String, Expr)>),

    /// Stable sort.
    Sort(Vec<SortKey>),

    Limit(u64),

    /// Keep the first row of each partition under `order`.
    FirstPerGroup {
        partition: Vec<String>,
        order: Vec<SortKey>,
    },
}

/// A logical plan: scan one entity, then apply steps.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until rendered or executed"]
pub struct Plan {
    pub source: Entity,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn scan(source: Entity) -> Self {
        Self {
            source,
            steps: Vec::new(),
        }
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Inner equi-join.
    pub fn lookup(self, from: Entity, local: &str, foreign: &str, alias: &str) -> Self {
        self.step(Step::Lookup {
            from,
            local: local.into(),
            foreign: foreign.into(),
            alias: alias.into(),
            kind: JoinKind::Inner,
        })
    }

    /// Left equi-join.
    pub fn left_lookup(self, from: Entity, local: &str, foreign: &str, alias: &str) -> Self {
        self.step(Step::Lookup {
            from,
            local: local.into(),
            foreign: foreign.into(),
            alias: alias.into(),
            kind: JoinKind::Left,
        })
    }

    pub fn filter(self, predicate: Expr) -> Self {
        self.step(Step::Filter(predicate))
    }

    pub fn group(self, keys: Vec<(&str, Expr)>, aggregates: Vec<(&str, Aggregate)>) -> Self {
        self.step(Step::Group {
            keys: keys.into_iter().map(|(k, e)| (k.to_string(), e)).collect(),
            aggregates: aggregates
                .into_iter()
                .map(|(k, a)| (k.to_string(), a))
                .collect(),
        })
    }

    pub fn project(self, columns: Vec<(&str, Expr)>) -> Self {
        self.step(Step::Project(
            columns
                .into_iter()
                .map(|(k, e)| (k.to_string(), e))
                .collect(),
        ))
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        self.step(Step::Sort(keys))
    }

    pub fn limit(self, n: u64) -> Self {
        self.step(Step::Limit(n))
    }

    pub fn first_per_group(self, partition: Vec<&str>, order: Vec<SortKey>) -> Self {
        self.step(Step::FirstPerGroup {
            partition: partition.into_iter().map(String::from).collect(),
            order,
        })
    }

    /// Output column names, if the plan ends in a known shape.
    ///
    /// Returns `None` when no group or project step fixes the columns.
    pub fn output_columns(&self) -> Option<Vec<String>> {
        let mut columns = None;
        for step in &self.steps {
            match step {
                Step::Group { keys, aggregates } => {
                    columns = Some(
                        keys.iter()
                            .map(|(k, _)| k.clone())
                            .chain(aggregates.iter().map(|(k, _)| k.clone()))
                            .collect(),
                    );
                }
                Step::Project(cols) => {
                    columns = Some(cols.iter().map(|(k, _)| k.clone()).collect());
                }
                _ => {}
            }
        }
        columns
    }

    /// Parameter names read anywhere in the plan.
    pub fn params(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for step in &self.steps {
            let exprs: Vec<&Expr> = match step {
                Step::Filter(e) => vec![e],
                Step::Group { keys, aggregates } => keys
                    .iter()
                    .map(|(_, e)| e)
                    .chain(aggregates.iter().filter_map(|(_, a)| a.input()))
                    .collect(),
                Step::Project(cols) => cols.iter().map(|(_, e)| e).collect(),
                _ => Vec::new(),
            };
            for e in exprs {
                for p in e.params() {
                    if !out.contains(&p) {
                        out.push(p);
                    }
                }
            }
        }
        out
    }
}

/// A one-row, one-column query whose result is bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarQuery {
    pub name: String,
    pub plan: Plan,
}

/// A report: sibling scalars to bind first, then the main plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub id: &'static str,
    pub columns: Vec<String>,
    pub preludes: Vec<ScalarQuery>,
    pub plan: Plan,
}

impl ReportPlan {
    pub fn new(id: &'static str, plan: Plan) -> Self {
        let columns = plan.output_columns().unwrap_or_default();
        Self {
            id,
            columns,
            preludes: Vec::new(),
            plan,
        }
    }

    /// Bind `name` to the single value produced by `plan` before the main plan runs.
    pub fn with_scalar(mut self, name: &str, plan: Plan) -> Self {
        self.preludes.push(ScalarQuery {
            name: name.into(),
            plan,
        });
        self
    }
}
