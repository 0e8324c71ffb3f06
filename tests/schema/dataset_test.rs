use chrono::NaiveDate;
use northwind_reports::schema::{index_specs, Dataset, DatasetError, Entity};
use northwind_reports::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

#[path = "../common/mod.rs"]
mod common;

fn dec(s: &str) -> Value {
    Value::Decimal(Decimal::from_str(s).unwrap())
}

#[test]
fn test_fixture_loads_every_collection() {
    let ds = common::dataset();
    assert_eq!(ds.len(Entity::Employees), 4);
    assert_eq!(ds.len(Entity::Customers), 5);
    assert_eq!(ds.len(Entity::Orders), 7);
    assert_eq!(ds.len(Entity::OrderDetails), 8);
    assert_eq!(ds.len(Entity::Products), 5);
    assert_eq!(ds.len(Entity::Categories), 3);
    assert_eq!(ds.len(Entity::Suppliers), 2);
}

#[test]
fn test_null_sentinel_becomes_missing() {
    let ds = common::dataset();
    let customers = ds.rows(Entity::Customers);
    let fax: Vec<Value> = customers.iter().map(|r| r.value("Fax")).collect();
    assert_eq!(
        fax,
        vec![
            Value::from("030-0076545"),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null
        ]
    );

    let employees = ds.rows(Entity::Employees);
    assert_eq!(employees[2].value("City"), Value::Null);
    assert_eq!(employees[3].value("City"), Value::Null);
}

#[test]
fn test_quoted_ids_and_decimals_are_numbers() {
    let ds = common::dataset();
    let employees = ds.rows(Entity::Employees);
    assert_eq!(employees[3].value("ReportsTo"), Value::Int(2));
    assert_eq!(employees[1].value("ReportsTo"), Value::Null);

    let lines = ds.rows(Entity::OrderDetails);
    assert_eq!(lines[0].value("UnitPrice"), dec("5.00"));
    assert_eq!(lines[0].value("Discount"), dec("0.5"));
}

#[test]
fn test_discontinued_accepts_flags() {
    let ds = common::dataset();
    let flags: Vec<Value> = ds
        .rows(Entity::Products)
        .iter()
        .map(|r| r.value("Discontinued"))
        .collect();
    assert_eq!(
        flags,
        vec![
            Value::Int(0),
            Value::Int(1),
            Value::Int(0),
            Value::Int(1),
            Value::Int(0)
        ]
    );
}

#[test]
fn test_order_dates_accept_several_layouts() {
    let ds = common::dataset();
    let dates: Vec<Value> = ds
        .rows(Entity::Orders)
        .iter()
        .map(|r| r.value("OrderDate"))
        .collect();
    let at = |y, m, d, h, min| {
        Value::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    };
    assert_eq!(dates[0], at(1997, 1, 15, 0, 0));
    assert_eq!(dates[1], at(1997, 3, 2, 0, 0));
    assert_eq!(dates[2], at(1997, 3, 20, 10, 30));
    assert_eq!(dates[3], at(1998, 1, 5, 0, 0));
}

#[test]
fn test_missing_file() {
    let err = Dataset::from_file("/nonexistent/northwind.json").unwrap_err();
    assert!(matches!(err, DatasetError::FileNotFound(_)));
}

#[test]
fn test_collection_must_be_array() {
    let err = Dataset::from_json(r#"{"orders": {"OrderID": 1}}"#).unwrap_err();
    assert!(matches!(err, DatasetError::NotAnArray(name) if name == "orders"));
}

#[test]
fn test_bad_date_names_the_record() {
    let err = Dataset::from_json(
        r#"{"orders": [{"OrderID": 1, "OrderDate": "1997-01-01"}, {"OrderID": 2, "OrderDate": "soon"}]}"#,
    )
    .unwrap_err();
    match err {
        DatasetError::Record {
            collection, index, ..
        } => {
            assert_eq!(collection, "orders");
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_every_index_targets_a_real_column() {
    for spec in index_specs() {
        assert!(spec.entity.has_column(spec.column), "{:?}", spec);
    }
}
