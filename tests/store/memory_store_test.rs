use northwind_reports::plan::{field, lit, param, Aggregate, Params, Plan, SortKey};
use northwind_reports::schema::{index_specs, Entity, IndexSpec};
use northwind_reports::{Row, Store, StoreError, Value};
use rust_decimal::Decimal;

#[path = "../common/mod.rs"]
mod common;

fn run(plan: &Plan) -> Vec<Row> {
    common::store().execute(plan, &Params::new()).unwrap()
}

fn column(rows: &[Row], name: &str) -> Vec<Value> {
    rows.iter().map(|r| r.value(name)).collect()
}

#[test]
fn test_indexed_and_unindexed_lookups_agree() {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::Customers, "CustomerID", "CustomerID", "customer")
        .project(vec![
            ("OrderID", field("OrderID")),
            ("Company", field("customer.CompanyName")),
        ]);

    let cold = common::store().execute(&plan, &Params::new()).unwrap();

    let mut warm_store = common::store();
    warm_store.ensure_indexes(&index_specs()).unwrap();
    let warm = warm_store.execute(&plan, &Params::new()).unwrap();

    assert_eq!(cold, warm);
    // ZZZZZ has no customer record
    assert_eq!(cold.len(), 6);
}

#[test]
fn test_lookup_chains_through_joined_fields() {
    let plan = Plan::scan(Entity::Orders)
        .filter(field("OrderID").eq(10248))
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .lookup(Entity::Products, "line.ProductID", "ProductID", "product")
        .project(vec![("Product", field("product.ProductName"))]);
    let rows = run(&plan);
    assert_eq!(
        column(&rows, "Product"),
        vec![Value::from("Alice Mutton"), Value::from("Chai")]
    );
}

#[test]
fn test_groups_come_out_in_key_order() {
    let plan = Plan::scan(Entity::Orders).group(
        vec![("CustomerID", field("CustomerID"))],
        vec![("n", Aggregate::Count)],
    );
    let rows = run(&plan);
    assert_eq!(
        column(&rows, "CustomerID"),
        vec![
            Value::from("ALFKI"),
            Value::from("ANATR"),
            Value::from("BERGS"),
            Value::from("BONAP"),
            Value::from("ZZZZZ"),
        ]
    );
    assert_eq!(
        column(&rows, "n"),
        vec![
            Value::Int(2),
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Int(1)
        ]
    );
}

#[test]
fn test_missing_values_sort_first_ascending_and_last_descending() {
    let asc = Plan::scan(Entity::Employees)
        .sort(vec![SortKey::asc("City")])
        .project(vec![("EmployeeID", field("EmployeeID"))]);
    assert_eq!(
        column(&run(&asc), "EmployeeID"),
        vec![Value::Int(3), Value::Int(4), Value::Int(1), Value::Int(2)]
    );

    let desc = Plan::scan(Entity::Employees)
        .sort(vec![SortKey::desc("City")])
        .project(vec![("EmployeeID", field("EmployeeID"))]);
    assert_eq!(
        column(&run(&desc), "EmployeeID"),
        vec![Value::Int(2), Value::Int(1), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn test_missing_comparisons_never_pass() {
    let plan = Plan::scan(Entity::Orders).filter(field("ShipPostalCode").ne("12209"));
    // 10249 and 10250 have no postal code and drop out of both branches
    assert_eq!(run(&plan).len(), 4);

    let negated = Plan::scan(Entity::Orders).filter(field("ShipPostalCode").eq("12209").not());
    assert_eq!(run(&negated).len(), 4);
}

#[test]
fn test_params_bind_into_filters() {
    let plan = Plan::scan(Entity::Products).filter(field("UnitPrice").gte(param("floor")));
    let mut params = Params::new();
    params.insert("floor".into(), Value::Decimal(Decimal::from(15)));
    let rows = common::store().execute(&plan, &params).unwrap();
    assert_eq!(
        column(&rows, "ProductName"),
        vec![Value::from("Boston Crab"), Value::from("Zaanse koeken")]
    );

    let err = common::store().execute(&plan, &Params::new()).unwrap_err();
    assert!(matches!(err, StoreError::UnboundParameter(name) if name == "floor"));
}

#[test]
fn test_sum_and_average_over_lines() {
    let plan = Plan::scan(Entity::OrderDetails).group(
        vec![],
        vec![
            (
                "revenue",
                Aggregate::Sum(field("UnitPrice").mul(field("Quantity"))),
            ),
            ("avg_qty", Aggregate::Avg(field("Quantity"))),
            ("top_price", Aggregate::Max(field("UnitPrice"))),
        ],
    );
    let rows = run(&plan);
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].value("revenue").as_decimal(),
        Some(Decimal::from(15230))
    );
    assert_eq!(
        rows[0].value("avg_qty").as_decimal(),
        Some(Decimal::from(1026) / Decimal::from(8))
    );
    assert_eq!(
        rows[0].value("top_price").as_decimal(),
        Some(Decimal::from(20))
    );
}

#[test]
fn test_zero_limit_is_empty() {
    let plan = Plan::scan(Entity::Products).limit(0);
    assert!(run(&plan).is_empty());
}

#[test]
fn test_reload_drops_indexes() {
    let mut store = common::store();
    store.ensure_indexes(&index_specs()).unwrap();
    assert!(store.has_index(Entity::Products, "CategoryID"));

    store.load(
        Entity::Products,
        vec![Row::new().with("ProductID", 1).with("CategoryID", 3)],
    );
    assert!(!store.has_index(Entity::Products, "CategoryID"));
    assert!(store.has_index(Entity::Orders, "CustomerID"));

    let plan = Plan::scan(Entity::Products)
        .lookup(Entity::Categories, "CategoryID", "CategoryID", "category")
        .project(vec![("Category", field("category.CategoryName"))]);
    let rows = store.execute(&plan, &Params::new()).unwrap();
    assert_eq!(column(&rows, "Category"), vec![Value::from("Produce")]);
}

#[test]
fn test_index_on_unknown_column_is_rejected() {
    let mut store = common::store();
    let err = store
        .ensure_indexes(&[IndexSpec {
            entity: Entity::Categories,
            column: "ProductID",
        }])
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownColumn { .. }));
}

#[test]
fn test_projected_literals() {
    let plan = Plan::scan(Entity::Categories)
        .limit(1)
        .project(vec![("k", lit("x")), ("n", lit(1))]);
    let rows = run(&plan);
    assert_eq!(rows[0].value("k"), Value::from("x"));
    assert_eq!(rows[0].value("n"), Value::Int(1));
}
