//! Plan to SQL rendering.
//!
//! A plan becomes one SELECT statement. Lookups become joins on the base
//! table; each group or project step fixes the row shape, and any later
//! step that needs to read the shaped rows wraps the query so far in a
//! derived table (`FROM (...) AS t1`). Sibling scalars are inlined as
//! scalar subqueries.

use std::collections::HashMap;
use tracing::debug;

use super::ddl::CreateIndex;
use super::dialect::{Dialect, SqlDialect};
use super::expr::{
    avg, case_when, cast, coalesce, col, count_star, extract, func, lit_bool, lit_decimal,
    lit_int, lit_null, lit_str, max, row_number, sum, table_col, DatePart, Expr as SqlExpr,
    ExprExt, WindowExt, WindowOrderBy,
};
use super::query::{JoinType, OrderByExpr, Query, TableRef};
use crate::plan::{Aggregate, BinaryOp, Expr, JoinKind, Plan, ReportPlan, SortKey, Step, Value};
use crate::schema::{index_specs, Entity};

/// Window column used to keep the first row of each partition.
const ROW_RANK: &str = "row_rank";

/// Error type for SQL rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unsupported plan shape: {0}")]
    Unsupported(String),

    #[error("Unbound parameter: {0}")]
    UnboundParameter(String),
}

/// Render a report as a single SQL statement.
pub fn render_report(report: &ReportPlan, dialect: Dialect) -> Result<String, RenderError> {
    Ok(report_query(report, dialect)?.to_sql(dialect))
}

/// Build the query for a report, with its sibling scalars inlined.
pub fn report_query(report: &ReportPlan, dialect: Dialect) -> Result<Query, RenderError> {
    let mut scalars = HashMap::new();
    for prelude in &report.preludes {
        let query = Renderer::new(&prelude.plan, dialect, &scalars).render(&prelude.plan)?;
        scalars.insert(prelude.name.clone(), query);
    }
    let query = Renderer::new(&report.plan, dialect, &scalars).render(&report.plan)?;
    debug!(report = report.id, %dialect, scalars = scalars.len(), "rendered SQL");
    Ok(query)
}

/// The `before` statements: one CREATE INDEX per key column.
pub fn render_setup(dialect: Dialect) -> Vec<String> {
    index_specs()
        .into_iter()
        .map(|spec| {
            CreateIndex::new(spec.name(), spec.entity.table_name())
                .if_not_exists()
                .column(spec.column)
                .to_sql(dialect)
        })
        .collect()
}

/// Where field references resolve.
enum Scope {
    /// The base table and its joins: `alias.Column` reads a joined table.
    Base {
        alias: &'static str,
        lookups: Vec<String>,
    },
    /// A derived table holding the tracked columns.
    Derived { alias: String },
}

struct Renderer<'a> {
    dialect: Dialect,
    scalars: &'a HashMap<String, Query>,
    query: Query,
    scope: Scope,
    /// The current query's select list defines the rows; read them by
    /// output name only in ORDER BY.
    projected: bool,
    columns: Vec<String>,
    next_alias: usize,
}

impl<'a> Renderer<'a> {
    fn new(plan: &Plan, dialect: Dialect, scalars: &'a HashMap<String, Query>) -> Self {
        let alias = plan.source.sql_alias();
        Self {
            dialect,
            scalars,
            query: Query::new().from(TableRef::new(plan.source.table_name()).with_alias(alias)),
            scope: Scope::Base {
                alias,
                lookups: Vec::new(),
            },
            projected: false,
            columns: Vec::new(),
            next_alias: 1,
        }
    }

    fn render(mut self, plan: &Plan) -> Result<Query, RenderError> {
        for step in &plan.steps {
            self.step(step)?;
        }
        if !self.projected {
            self.select_tracked()?;
        }
        Ok(self.query)
    }

    fn step(&mut self, step: &Step) -> Result<(), RenderError> {
        match step {
            Step::Lookup {
                from,
                local,
                foreign,
                alias,
                kind,
            } => self.lookup(*from, local, foreign, alias, *kind),

            Step::Filter(predicate) => {
                if self.projected || self.query.limit.is_some() {
                    self.wrap()?;
                }
                let condition = self.expr(predicate)?;
                self.query = std::mem::take(&mut self.query).filter(condition);
                Ok(())
            }

            Step::Group { keys, aggregates } => {
                if self.projected || self.query.limit.is_some() {
                    self.wrap()?;
                }
                let mut select = Vec::with_capacity(keys.len() + aggregates.len());
                let mut group_by = Vec::with_capacity(keys.len());
                for (name, key) in keys {
                    let e = self.expr(key)?;
                    group_by.push(e.clone());
                    select.push(e.alias(name));
                }
                for (name, agg) in aggregates {
                    select.push(self.aggregate(agg)?.alias(name));
                }
                self.query.select = select;
                self.query.group_by = group_by;
                self.query.order_by.clear();
                self.columns = keys
                    .iter()
                    .map(|(k, _)| k.clone())
                    .chain(aggregates.iter().map(|(k, _)| k.clone()))
                    .collect();
                self.projected = true;
                Ok(())
            }

            Step::Project(columns) => {
                if self.projected || self.query.limit.is_some() {
                    self.wrap()?;
                }
                let mut select = Vec::with_capacity(columns.len());
                for (name, e) in columns {
                    select.push(self.expr(e)?.alias(name));
                }
                self.query.select = select;
                self.columns = columns.iter().map(|(k, _)| k.clone()).collect();
                self.projected = true;
                Ok(())
            }

            Step::Sort(keys) => {
                if self.query.limit.is_some() {
                    self.wrap()?;
                }
                // A stable sort keeps the previous order among ties.
                let mut order: Vec<OrderByExpr> =
                    keys.iter().map(|k| self.order_key(k)).collect();
                order.append(&mut self.query.order_by);
                self.query.order_by = order;
                Ok(())
            }

            Step::Limit(n) => {
                let n = self.query.limit.map_or(*n, |m| m.min(*n));
                self.query.limit = Some(n);
                Ok(())
            }

            Step::FirstPerGroup { partition, order } => {
                if self.projected || self.query.limit.is_some() {
                    self.wrap()?;
                }
                self.select_tracked()?;
                let window = row_number()
                    .over()
                    .partition_by(partition.iter().map(|f| self.column(f)).collect())
                    .order_by(order.iter().map(|k| self.window_key(k)).collect())
                    .build();
                self.query.select.push(window.alias(ROW_RANK));
                self.query.order_by.clear();
                self.projected = true;
                self.wrap()?;
                let rank = self.column(ROW_RANK);
                self.query = std::mem::take(&mut self.query).filter(rank.eq(1));
                Ok(())
            }
        }
    }

    fn lookup(
        &mut self,
        from: Entity,
        local: &str,
        foreign: &str,
        alias: &str,
        kind: JoinKind,
    ) -> Result<(), RenderError> {
        if self.projected || self.query.limit.is_some() {
            return Err(RenderError::Unsupported(format!(
                "lookup of {} after the rows were reshaped",
                from
            )));
        }
        let on = self.column(local).eq(table_col(alias, foreign));
        match &mut self.scope {
            Scope::Base { lookups, .. } => lookups.push(alias.to_string()),
            Scope::Derived { .. } => {
                return Err(RenderError::Unsupported(format!(
                    "lookup of {} on a derived table",
                    from
                )))
            }
        }
        let table = TableRef::new(from.table_name()).with_alias(alias);
        let join_type = match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
        };
        self.query = std::mem::take(&mut self.query).join(join_type, table, on);
        Ok(())
    }

    /// Nest the query so far as a derived table.
    fn wrap(&mut self) -> Result<(), RenderError> {
        if !self.projected {
            self.select_tracked()?;
        }
        let alias = format!("t{}", self.next_alias);
        self.next_alias += 1;
        let inner = std::mem::take(&mut self.query);
        self.query = Query::new().from_subquery(inner, &alias);
        self.scope = Scope::Derived { alias };
        self.projected = false;
        Ok(())
    }

    /// Select every tracked column of the derived table.
    fn select_tracked(&mut self) -> Result<(), RenderError> {
        match &self.scope {
            Scope::Base { .. } => Err(RenderError::Unsupported(
                "rows must pass a group or project step to have output columns".into(),
            )),
            Scope::Derived { alias } => {
                self.query.select = self
                    .columns
                    .iter()
                    .map(|c| table_col(alias, c).into())
                    .collect();
                Ok(())
            }
        }
    }

    fn column(&self, name: &str) -> SqlExpr {
        match &self.scope {
            Scope::Base { alias, lookups } => match name.split_once('.') {
                Some((prefix, rest)) if lookups.iter().any(|l| l == prefix) => {
                    table_col(prefix, rest)
                }
                _ => table_col(alias, name),
            },
            Scope::Derived { alias } => table_col(alias, name),
        }
    }

    fn sort_ref(&self, field: &str) -> SqlExpr {
        if self.projected {
            col(field)
        } else {
            self.column(field)
        }
    }

    // Missing values sort first in both directions' reading order: ahead of
    // everything ascending, after everything descending.
    fn order_key(&self, key: &SortKey) -> OrderByExpr {
        let e = self.sort_ref(&key.field);
        if key.descending {
            OrderByExpr::desc(e).nulls_last()
        } else {
            OrderByExpr::asc(e).nulls_first()
        }
    }

    fn window_key(&self, key: &SortKey) -> WindowOrderBy {
        let e = self.column(&key.field);
        if key.descending {
            WindowOrderBy::desc(e).nulls_last()
        } else {
            WindowOrderBy::asc(e).nulls_first()
        }
    }

    fn aggregate(&self, agg: &Aggregate) -> Result<SqlExpr, RenderError> {
        Ok(match agg {
            Aggregate::Count => count_star(),
            Aggregate::CountIf(predicate) => coalesce(vec![
                sum(case_when(self.expr(predicate)?, lit_int(1), lit_int(0))),
                lit_int(0),
            ]),
            Aggregate::Sum(e) => coalesce(vec![sum(self.expr(e)?), lit_int(0)]),
            Aggregate::Avg(e) => avg(self.expr(e)?),
            Aggregate::Max(e) => max(self.expr(e)?),
        })
    }

    fn expr(&self, e: &Expr) -> Result<SqlExpr, RenderError> {
        Ok(match e {
            Expr::Field(name) => self.column(name),
            Expr::Literal(v) => literal(v),
            Expr::Param(name) => self
                .scalars
                .get(name)
                .cloned()
                .map(SqlExpr::from)
                .ok_or_else(|| RenderError::UnboundParameter(name.clone()))?,

            Expr::Binary { left, op, right } => {
                let l = self.expr(left)?;
                let r = self.expr(right)?;
                match op {
                    BinaryOp::Add => l.add(r),
                    BinaryOp::Sub => l.sub(r),
                    BinaryOp::Mul => l.mul(r),
                    BinaryOp::Div => self.safe_div(l, r),
                    BinaryOp::Eq => l.eq(r),
                    BinaryOp::Ne => l.ne(r),
                    BinaryOp::Lt => l.lt(r),
                    BinaryOp::Lte => l.lte(r),
                    BinaryOp::Gt => l.gt(r),
                    BinaryOp::Gte => l.gte(r),
                    BinaryOp::And => l.and(r),
                    BinaryOp::Or => l.or(r),
                }
            }

            Expr::Not(inner) => self.expr(inner)?.not(),

            Expr::Concat(parts) => {
                let mut parts = parts.iter();
                match parts.next() {
                    None => lit_str(""),
                    Some(first) => {
                        let mut out = self.expr(first)?;
                        for part in parts {
                            out = out.concat(self.expr(part)?);
                        }
                        out
                    }
                }
            }

            Expr::IfMissing { expr, default } => {
                func("IFNULL", vec![self.expr(expr)?, self.expr(default)?])
            }

            Expr::IsMissing(inner) => self.expr(inner)?.is_null(),

            Expr::Round { expr, digits } => {
                func("ROUND", vec![self.expr(expr)?, lit_int(*digits as i64)])
            }

            Expr::Year(inner) => extract(DatePart::Year, self.expr(inner)?),
            Expr::Month(inner) => extract(DatePart::Month, self.expr(inner)?),
            Expr::DateString(inner) => func(
                "STRFTIME",
                vec![self.expr(inner)?, lit_str(self.dialect.date_format_pattern())],
            ),

            Expr::StartsWithAny { expr, chars } => func(
                "SUBSTRING",
                vec![self.expr(expr)?, lit_int(1), lit_int(1)],
            )
            .in_list(chars.iter().map(|c| lit_str(&c.to_string())).collect()),

            Expr::CharsAt { expr, positions } => {
                let target = self.expr(expr)?;
                match like_pattern(positions) {
                    Some(pattern) => target.like(&pattern),
                    None => {
                        // Wildcard characters cannot go in a LIKE pattern unescaped
                        let mut checks = positions.iter().map(|(i, c)| {
                            func(
                                "SUBSTRING",
                                vec![target.clone(), lit_int(*i as i64 + 1), lit_int(1)],
                            )
                            .eq(lit_str(&c.to_string()))
                        });
                        match checks.next() {
                            None => target.is_not_null(),
                            Some(first) => checks.fold(first, |acc, check| acc.and(check)),
                        }
                    }
                }
            }
        })
    }

    /// `a / b`, or 0 when `b` is zero.
    fn safe_div(&self, numerator: SqlExpr, denominator: SqlExpr) -> SqlExpr {
        let numerator = match self.dialect.fractional_division_cast() {
            Some(type_name) => cast(numerator, type_name),
            None => numerator,
        };
        case_when(
            denominator.clone().eq(lit_int(0)),
            lit_int(0),
            numerator.div(denominator),
        )
    }
}

fn literal(v: &Value) -> SqlExpr {
    match v {
        Value::Null => lit_null(),
        Value::Bool(b) => lit_bool(*b),
        Value::Int(n) => lit_int(*n),
        Value::Decimal(d) => lit_decimal(*d),
        Value::Text(s) => lit_str(s),
        Value::DateTime(dt) => lit_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string()),
    }
}

/// `F__n%` style pattern, or `None` when a fixed character is a LIKE wildcard.
fn like_pattern(positions: &[(usize, char)]) -> Option<String> {
    if positions.iter().any(|(_, c)| matches!(c, '%' | '_' | '\\')) {
        return None;
    }
    let len = positions.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
    let mut chars = vec!['_'; len];
    for (i, c) in positions {
        chars[*i] = *c;
    }
    let mut pattern: String = chars.into_iter().collect();
    pattern.push('%');
    Some(pattern)
}
