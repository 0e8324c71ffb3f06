//! Tunable report parameters.
//!
//! Read from the `[reports]` section of `northwind.toml`:
//! ```toml
//! [reports]
//! monthly_orders_year = 1997
//! min_price = 5
//! max_price = 15
//! fax_country = "Germany"
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Parameters the report plans are built with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportParams {
    /// Year bucketed by month (task_1_15).
    pub monthly_orders_year: i32,

    /// Year bucketed by day (task_1_18).
    pub daily_orders_year: i32,

    /// Inclusive price range (task_1_11).
    pub min_price: Decimal,
    pub max_price: Decimal,

    /// How many of the most expensive products to keep (task_1_12).
    pub top_products: u64,

    /// Revenue a customer must exceed (task_1_19).
    pub revenue_threshold: Decimal,

    /// Accepted first characters of a product name (task_1_5).
    pub name_prefixes: String,

    /// Fixed first and fourth characters of a contact name (task_1_9).
    pub contact_first: char,
    pub contact_fourth: char,

    /// Restrict customers without fax to one country (task_1_3).
    pub fax_country: Option<String>,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            monthly_orders_year: 1997,
            daily_orders_year: 1998,
            min_price: Decimal::from(5),
            max_price: Decimal::from(15),
            top_products: 20,
            revenue_threshold: Decimal::from(10_000),
            name_prefixes: "ABCDEF".to_string(),
            contact_first: 'F',
            contact_fourth: 'n',
            fax_country: None,
        }
    }
}
