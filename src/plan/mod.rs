//! Logical query plans.
//!
//! One plan abstraction, three consumers: the SQL renderer, the
//! aggregation-pipeline renderer, and the in-memory executor.
//!
//! ```text
//! Plan::scan(Orders)
//!   Lookup(OrderDetails as line)   -- equi-join, one row per match
//!   Filter(expr)
//!   Group { keys, aggregates }     -- keyless group: exactly one row
//!   Project [(name, expr)]
//!   Sort [keys] / Limit n
//!   FirstPerGroup { partition, order }
//! ```

pub mod expr;
pub mod step;
pub mod value;

use std::collections::BTreeMap;

pub use expr::{concat, field, lit, param, BinaryOp, Expr};
pub use step::{Aggregate, JoinKind, Plan, ReportPlan, ScalarQuery, SortKey, Step};
pub use value::{Row, Value};

/// Bound scalar parameters, by name.
pub type Params = BTreeMap<String, Value>;
