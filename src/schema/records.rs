//! Typed dataset records.
//!
//! Source data arrives from two kinds of export and is not uniform: nullable
//! fields may be absent, `null`, or the text `"NULL"`; numbers may be quoted;
//! `OrderDate` may be a timestamp string in several layouts. The field
//! deserializers in [`de`] fold all of that into `Option` and exact decimals
//! so reports only ever see one representation.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::Entity;
use crate::plan::value::Row;

/// A record type of the dataset.
pub trait Record: DeserializeOwned {
    const ENTITY: Entity;

    /// Flatten into a row keyed by the entity's column names.
    fn to_row(&self) -> Row;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Employee {
    #[serde(rename = "EmployeeID", deserialize_with = "de::int")]
    pub employee_id: i64,
    #[serde(rename = "LastName", default, deserialize_with = "de::text")]
    pub last_name: String,
    #[serde(rename = "FirstName", default, deserialize_with = "de::text")]
    pub first_name: String,
    #[serde(rename = "Title", default, deserialize_with = "de::opt_text")]
    pub title: Option<String>,
    #[serde(rename = "TitleOfCourtesy", default, deserialize_with = "de::opt_text")]
    pub title_of_courtesy: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "de::opt_text")]
    pub city: Option<String>,
    #[serde(rename = "ReportsTo", default, deserialize_with = "de::opt_int")]
    pub reports_to: Option<i64>,
}

impl Record for Employee {
    const ENTITY: Entity = Entity::Employees;

    fn to_row(&self) -> Row {
        Row::new()
            .with("EmployeeID", self.employee_id)
            .with("LastName", self.last_name.clone())
            .with("FirstName", self.first_name.clone())
            .with("Title", self.title.clone())
            .with("TitleOfCourtesy", self.title_of_courtesy.clone())
            .with("City", self.city.clone())
            .with("ReportsTo", self.reports_to)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerID", deserialize_with = "de::text")]
    pub customer_id: String,
    #[serde(rename = "CompanyName", default, deserialize_with = "de::text")]
    pub company_name: String,
    #[serde(rename = "ContactName", default, deserialize_with = "de::opt_text")]
    pub contact_name: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "de::opt_text")]
    pub country: Option<String>,
    #[serde(rename = "Fax", default, deserialize_with = "de::opt_text")]
    pub fax: Option<String>,
}

impl Record for Customer {
    const ENTITY: Entity = Entity::Customers;

    fn to_row(&self) -> Row {
        Row::new()
            .with("CustomerID", self.customer_id.clone())
            .with("CompanyName", self.company_name.clone())
            .with("ContactName", self.contact_name.clone())
            .with("Country", self.country.clone())
            .with("Fax", self.fax.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    #[serde(rename = "OrderID", deserialize_with = "de::int")]
    pub order_id: i64,
    #[serde(rename = "CustomerID", default, deserialize_with = "de::opt_text")]
    pub customer_id: Option<String>,
    #[serde(rename = "EmployeeID", default, deserialize_with = "de::opt_int")]
    pub employee_id: Option<i64>,
    #[serde(rename = "OrderDate", default, deserialize_with = "de::opt_datetime")]
    pub order_date: Option<NaiveDateTime>,
    #[serde(rename = "ShipCountry", default, deserialize_with = "de::opt_text")]
    pub ship_country: Option<String>,
    #[serde(rename = "ShipPostalCode", default, deserialize_with = "de::opt_text")]
    pub ship_postal_code: Option<String>,
}

impl Record for Order {
    const ENTITY: Entity = Entity::Orders;

    fn to_row(&self) -> Row {
        Row::new()
            .with("OrderID", self.order_id)
            .with("CustomerID", self.customer_id.clone())
            .with("EmployeeID", self.employee_id)
            .with("OrderDate", self.order_date)
            .with("ShipCountry", self.ship_country.clone())
            .with("ShipPostalCode", self.ship_postal_code.clone())
    }
}

/// One line of an order. `Discount` is an absolute currency amount per unit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "OrderID", deserialize_with = "de::int")]
    pub order_id: i64,
    #[serde(rename = "ProductID", deserialize_with = "de::int")]
    pub product_id: i64,
    #[serde(rename = "UnitPrice", deserialize_with = "de::decimal")]
    pub unit_price: Decimal,
    #[serde(rename = "Quantity", deserialize_with = "de::int")]
    pub quantity: i64,
    #[serde(rename = "Discount", default, deserialize_with = "de::decimal_or_zero")]
    pub discount: Decimal,
}

impl Record for OrderLine {
    const ENTITY: Entity = Entity::OrderDetails;

    fn to_row(&self) -> Row {
        Row::new()
            .with("OrderID", self.order_id)
            .with("ProductID", self.product_id)
            .with("UnitPrice", self.unit_price)
            .with("Quantity", self.quantity)
            .with("Discount", self.discount)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID", deserialize_with = "de::int")]
    pub product_id: i64,
    #[serde(rename = "ProductName", default, deserialize_with = "de::text")]
    pub product_name: String,
    #[serde(rename = "SupplierID", default, deserialize_with = "de::opt_int")]
    pub supplier_id: Option<i64>,
    #[serde(rename = "CategoryID", default, deserialize_with = "de::opt_int")]
    pub category_id: Option<i64>,
    #[serde(rename = "QuantityPerUnit", default, deserialize_with = "de::opt_text")]
    pub quantity_per_unit: Option<String>,
    #[serde(rename = "UnitPrice", default, deserialize_with = "de::opt_decimal")]
    pub unit_price: Option<Decimal>,
    #[serde(rename = "UnitsInStock", default, deserialize_with = "de::opt_int")]
    pub units_in_stock: Option<i64>,
    #[serde(rename = "UnitsOnOrder", default, deserialize_with = "de::opt_int")]
    pub units_on_order: Option<i64>,
    #[serde(rename = "Discontinued", default, deserialize_with = "de::flag")]
    pub discontinued: i64,
}

impl Record for Product {
    const ENTITY: Entity = Entity::Products;

    fn to_row(&self) -> Row {
        Row::new()
            .with("ProductID", self.product_id)
            .with("ProductName", self.product_name.clone())
            .with("SupplierID", self.supplier_id)
            .with("CategoryID", self.category_id)
            .with("QuantityPerUnit", self.quantity_per_unit.clone())
            .with("UnitPrice", self.unit_price)
            .with("UnitsInStock", self.units_in_stock)
            .with("UnitsOnOrder", self.units_on_order)
            .with("Discontinued", self.discontinued)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    #[serde(rename = "CategoryID", deserialize_with = "de::int")]
    pub category_id: i64,
    #[serde(rename = "CategoryName", default, deserialize_with = "de::text")]
    pub category_name: String,
}

impl Record for Category {
    const ENTITY: Entity = Entity::Categories;

    fn to_row(&self) -> Row {
        Row::new()
            .with("CategoryID", self.category_id)
            .with("CategoryName", self.category_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Supplier {
    #[serde(rename = "SupplierID", deserialize_with = "de::int")]
    pub supplier_id: i64,
    #[serde(rename = "CompanyName", default, deserialize_with = "de::text")]
    pub company_name: String,
}

impl Record for Supplier {
    const ENTITY: Entity = Entity::Suppliers;

    fn to_row(&self) -> Row {
        Row::new()
            .with("SupplierID", self.supplier_id)
            .with("CompanyName", self.company_name.clone())
    }
}

/// Field deserializers shared by the records.
pub(crate) mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as Json;
    use std::str::FromStr;

    /// The text sentinel some exports use in place of a null.
    pub const NULL_SENTINEL: &str = "NULL";

    const DATE_TIME_LAYOUTS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Read a raw JSON value, folding absent-equivalents into `None`.
    fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Json>, D::Error> {
        let raw = Option::<Json>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(Json::Null) => None,
            Some(Json::String(s)) if s == NULL_SENTINEL => None,
            Some(other) => Some(other),
        })
    }

    fn json_to_text(value: Json) -> Result<String, String> {
        match value {
            Json::String(s) => Ok(s),
            Json::Number(n) => Ok(n.to_string()),
            Json::Bool(b) => Ok(b.to_string()),
            other => Err(format!("expected text, found {}", other)),
        }
    }

    fn json_to_int(value: Json) -> Result<i64, String> {
        match value {
            Json::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(float_to_int))
                .ok_or_else(|| format!("expected integer, found {}", n)),
            Json::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("expected integer, found {:?}", s)),
            Json::Bool(b) => Ok(b as i64),
            other => Err(format!("expected integer, found {}", other)),
        }
    }

    /// Whole floats inside the i64 range; `as` would saturate anything else.
    fn float_to_int(f: f64) -> Option<i64> {
        const BOUND: f64 = 9_223_372_036_854_775_808.0;
        (f.fract() == 0.0 && (-BOUND..BOUND).contains(&f)).then_some(f as i64)
    }

    fn parse_decimal(s: &str) -> Result<Decimal, String> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| format!("expected decimal, found {:?}", s))
    }

    fn json_to_decimal(value: Json) -> Result<Decimal, String> {
        match value {
            // Number::to_string keeps the literal digits, so no float rounding creeps in
            Json::Number(n) => parse_decimal(&n.to_string()),
            Json::String(s) => parse_decimal(&s),
            other => Err(format!("expected decimal, found {}", other)),
        }
    }

    pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        for layout in DATE_TIME_LAYOUTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match present(deserializer)? {
            Some(v) => json_to_text(v).map_err(D::Error::custom),
            None => Ok(String::new()),
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        present(deserializer)?
            .map(|v| json_to_text(v).map_err(D::Error::custom))
            .transpose()
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match present(deserializer)? {
            Some(v) => json_to_int(v).map_err(D::Error::custom),
            None => Err(D::Error::custom("missing required integer")),
        }
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        present(deserializer)?
            .map(|v| json_to_int(v).map_err(D::Error::custom))
            .transpose()
    }

    pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match present(deserializer)? {
            Some(v) => json_to_decimal(v).map_err(D::Error::custom),
            None => Err(D::Error::custom("missing required decimal")),
        }
    }

    pub fn decimal_or_zero<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Decimal, D::Error> {
        Ok(opt_decimal(deserializer)?.unwrap_or(Decimal::ZERO))
    }

    pub fn opt_decimal<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        present(deserializer)?
            .map(|v| json_to_decimal(v).map_err(D::Error::custom))
            .transpose()
    }

    /// Boolean-as-integer: accepts `0/1`, `true/false` and their quoted forms.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let n = match present(deserializer)? {
            None => 0,
            Some(Json::String(s)) if s.eq_ignore_ascii_case("true") => 1,
            Some(Json::String(s)) if s.eq_ignore_ascii_case("false") => 0,
            Some(v) => json_to_int(v).map_err(D::Error::custom)?,
        };
        Ok(if n != 0 { 1 } else { 0 })
    }

    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match present(deserializer)? {
            None => Ok(None),
            Some(Json::String(s)) => parse_datetime(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date {:?}", s))),
            // Extended JSON exports wrap dates as {"$date": "..."}
            Some(Json::Object(map)) => match map.get("$date") {
                Some(Json::String(s)) => parse_datetime(s)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom(format!("invalid date {:?}", s))),
                _ => Err(D::Error::custom("unsupported date object")),
            },
            Some(other) => Err(D::Error::custom(format!("invalid date {}", other))),
        }
    }
}
