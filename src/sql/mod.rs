//! SQL generation module.
//!
//! Renders report plans as multi-dialect SQL through a typed builder:
//!
//! - [`render`] - plan → query translation and the `before` statements
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`ddl`] - CREATE INDEX
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod ddl;
pub mod dialect;
pub mod expr;
pub mod query;
pub mod render;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use ddl::CreateIndex;
pub use dialect::{Dialect, SqlDialect};
pub use expr::{col, table_col, BinaryOperator, Expr, ExprExt, Literal, WindowExt, WindowOrderBy};
pub use query::{FromItem, Join, JoinType, NullsOrder, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use render::{render_report, render_setup, report_query, RenderError};
pub use token::{Token, TokenStream};
