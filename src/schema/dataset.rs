//! Loading a dataset from a JSON document.
//!
//! The document is an object keyed by collection (or table) name:
//!
//! ```json
//! {
//!   "employees": [ { "EmployeeID": 1, "FirstName": "Nancy", ... } ],
//!   "order-details": [ { "OrderID": 10248, "ProductID": 11, ... } ]
//! }
//! ```
//!
//! Unknown keys are skipped with a warning; missing collections are empty.

use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::records::{
    Category, Customer, Employee, Order, OrderLine, Product, Record, Supplier,
};
use super::Entity;
use crate::plan::value::Row;

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset root must be an object keyed by collection name")]
    NotAnObject,

    #[error("Collection '{0}' must be an array")]
    NotAnArray(String),

    #[error("Invalid record {collection}[{index}]: {message}")]
    Record {
        collection: String,
        index: usize,
        message: String,
    },
}

/// The full read-only dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub employees: Vec<Employee>,
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<OrderLine>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub suppliers: Vec<Supplier>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dataset from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a dataset from JSON text.
    pub fn from_json(content: &str) -> Result<Self, DatasetError> {
        let root: Json = serde_json::from_str(content)?;
        let Json::Object(collections) = root else {
            return Err(DatasetError::NotAnObject);
        };

        let mut dataset = Dataset::new();
        for (key, records) in collections {
            let Some(entity) = Entity::from_name(&key) else {
                warn!(collection = %key, "skipping unknown collection");
                continue;
            };
            let Json::Array(items) = records else {
                return Err(DatasetError::NotAnArray(key));
            };
            match entity {
                Entity::Employees => dataset.employees.extend(parse_all::<Employee>(&key, items)?),
                Entity::Customers => dataset.customers.extend(parse_all::<Customer>(&key, items)?),
                Entity::Orders => dataset.orders.extend(parse_all::<Order>(&key, items)?),
                Entity::OrderDetails => dataset.order_lines.extend(parse_all::<OrderLine>(&key, items)?),
                Entity::Products => dataset.products.extend(parse_all::<Product>(&key, items)?),
                Entity::Categories => dataset.categories.extend(parse_all::<Category>(&key, items)?),
                Entity::Suppliers => dataset.suppliers.extend(parse_all::<Supplier>(&key, items)?),
            }
        }

        debug!(
            employees = dataset.employees.len(),
            customers = dataset.customers.len(),
            orders = dataset.orders.len(),
            order_lines = dataset.order_lines.len(),
            products = dataset.products.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Rows of one entity, in source order.
    pub fn rows(&self, entity: Entity) -> Vec<Row> {
        match entity {
            Entity::Employees => to_rows(&self.employees),
            Entity::Customers => to_rows(&self.customers),
            Entity::Orders => to_rows(&self.orders),
            Entity::OrderDetails => to_rows(&self.order_lines),
            Entity::Products => to_rows(&self.products),
            Entity::Categories => to_rows(&self.categories),
            Entity::Suppliers => to_rows(&self.suppliers),
        }
    }

    pub fn len(&self, entity: Entity) -> usize {
        match entity {
            Entity::Employees => self.employees.len(),
            Entity::Customers => self.customers.len(),
            Entity::Orders => self.orders.len(),
            Entity::OrderDetails => self.order_lines.len(),
            Entity::Products => self.products.len(),
            Entity::Categories => self.categories.len(),
            Entity::Suppliers => self.suppliers.len(),
        }
    }
}

fn parse_all<T: Record>(collection: &str, items: Vec<Json>) -> Result<Vec<T>, DatasetError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| DatasetError::Record {
                collection: collection.to_string(),
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

fn to_rows<T: Record>(records: &[T]) -> Vec<Row> {
    records.iter().map(Record::to_row).collect()
}
