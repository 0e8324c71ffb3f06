//! Schema model for the sales dataset.
//!
//! - [`Entity`] - the seven entity kinds with their table and collection names
//! - [`records`] - typed records with ingestion-time null normalization
//! - [`dataset`] - loading a whole dataset from one JSON document
//! - [`index_specs`] - the key-column indexes provisioned before any report runs

pub mod dataset;
pub mod records;

pub use dataset::{Dataset, DatasetError};
pub use records::{Category, Customer, Employee, Order, OrderLine, Product, Record, Supplier};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns every report joins on. Each gets a lookup index wherever it appears.
pub const KEY_COLUMNS: [&str; 6] = [
    "OrderID",
    "CustomerID",
    "ProductID",
    "CategoryID",
    "SupplierID",
    "EmployeeID",
];

/// An entity kind of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entity {
    Employees,
    Customers,
    Orders,
    OrderDetails,
    Products,
    Categories,
    Suppliers,
}

impl Entity {
    pub const ALL: [Entity; 7] = [
        Entity::Employees,
        Entity::Customers,
        Entity::Orders,
        Entity::OrderDetails,
        Entity::Products,
        Entity::Categories,
        Entity::Suppliers,
    ];

    /// Relational table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            Entity::Employees => "Employees",
            Entity::Customers => "Customers",
            Entity::Orders => "Orders",
            Entity::OrderDetails => "OrderDetails",
            Entity::Products => "Products",
            Entity::Categories => "Categories",
            Entity::Suppliers => "Suppliers",
        }
    }

    /// Document collection name.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Entity::Employees => "employees",
            Entity::Customers => "customers",
            Entity::Orders => "orders",
            Entity::OrderDetails => "order-details",
            Entity::Products => "products",
            Entity::Categories => "categories",
            Entity::Suppliers => "suppliers",
        }
    }

    /// Short alias used for the base table of a rendered SELECT.
    pub fn sql_alias(&self) -> &'static str {
        match self {
            Entity::Employees => "e",
            Entity::Customers => "c",
            Entity::Orders => "o",
            Entity::OrderDetails => "od",
            Entity::Products => "p",
            Entity::Categories => "cat",
            Entity::Suppliers => "s",
        }
    }

    /// Columns carried by the entity, in source order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Entity::Employees => &[
                "EmployeeID",
                "LastName",
                "FirstName",
                "Title",
                "TitleOfCourtesy",
                "City",
                "ReportsTo",
            ],
            Entity::Customers => &[
                "CustomerID",
                "CompanyName",
                "ContactName",
                "Country",
                "Fax",
            ],
            Entity::Orders => &[
                "OrderID",
                "CustomerID",
                "EmployeeID",
                "OrderDate",
                "ShipCountry",
                "ShipPostalCode",
            ],
            Entity::OrderDetails => &["OrderID", "ProductID", "UnitPrice", "Quantity", "Discount"],
            Entity::Products => &[
                "ProductID",
                "ProductName",
                "SupplierID",
                "CategoryID",
                "QuantityPerUnit",
                "UnitPrice",
                "UnitsInStock",
                "UnitsOnOrder",
                "Discontinued",
            ],
            Entity::Categories => &["CategoryID", "CategoryName"],
            Entity::Suppliers => &["SupplierID", "CompanyName"],
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Resolve a table or collection name (case-insensitive, `-`/`_` agnostic).
    pub fn from_name(name: &str) -> Option<Entity> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Entity::ALL
            .into_iter()
            .find(|e| e.table_name().to_lowercase() == wanted)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// A single-column lookup index on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexSpec {
    pub entity: Entity,
    pub column: &'static str,
}

impl IndexSpec {
    /// Stable index name, e.g. `idx_orders_customerid`.
    pub fn name(&self) -> String {
        format!(
            "idx_{}_{}",
            self.entity.table_name().to_lowercase(),
            self.column.to_lowercase()
        )
    }
}

/// Every key-column index required before reports run.
pub fn index_specs() -> Vec<IndexSpec> {
    Entity::ALL
        .into_iter()
        .flat_map(|entity| {
            KEY_COLUMNS
                .into_iter()
                .filter(move |column| entity.has_column(column))
                .map(move |column| IndexSpec { entity, column })
        })
        .collect()
}
