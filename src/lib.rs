//! # Northwind Reports
//!
//! A catalog of sales reports over the Northwind dataset, expressed once as
//! backend-neutral plans and rendered for relational and document stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │             Report catalog (task_1_1 … task_1_22)        │
//! │             + ReportParams from northwind.toml           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog]
//! ┌─────────────────────────────────────────────────────────┐
//! │       ReportPlan (sibling scalars + logical plan)        │
//! └─────────────────────────────────────────────────────────┘
//!            │                  │                  │
//!            ▼ [sql]            ▼ [document]       ▼ [store]
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐
//! │ One SELECT per   │ │ Aggregate        │ │ MemoryStore      │
//! │ dialect          │ │ pipelines        │ │ executes rows    │
//! └──────────────────┘ └──────────────────┘ └──────────────────┘
//! ```

pub mod config;
pub mod document;
pub mod plan;
pub mod report;
pub mod schema;
pub mod sql;
pub mod store;

pub use plan::{Params, Plan, ReportPlan, Row, Value};
pub use report::{ReportError, ReportParams, ReportRunner, ResultSet};
pub use schema::{Dataset, Entity};
pub use store::{MemoryStore, Store, StoreError};
