//! Store adapters.
//!
//! A store accepts a logical [`Plan`] and returns rows. Adapters for real
//! engines translate the plan into their own query language (see
//! [`crate::sql`] and [`crate::document`]); [`MemoryStore`] executes plans
//! directly and serves as the reference semantics.

pub mod eval;
pub mod memory;

pub use memory::MemoryStore;

use crate::plan::{Params, Plan, Row};
use crate::schema::{Entity, IndexSpec};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unbound parameter: {0}")]
    UnboundParameter(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Entity {entity} has no column '{column}'")]
    UnknownColumn { entity: Entity, column: String },

    /// Failure reported by the underlying engine, passed through unmodified.
    #[error("{backend} store error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The execution contract every backend satisfies.
///
/// `execute` is read-only; stores that are `Sync` may serve concurrent
/// reports without coordination.
pub trait Store {
    /// Backend name for display/logging.
    fn backend(&self) -> &'static str;

    /// Make sure a lookup index exists for each spec. Must be idempotent.
    fn ensure_indexes(&mut self, specs: &[IndexSpec]) -> StoreResult<()>;

    /// Run a plan with the given bound parameters.
    fn execute(&self, plan: &Plan, params: &Params) -> StoreResult<Vec<Row>>;
}
