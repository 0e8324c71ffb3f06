use northwind_reports::report::ReportError;
use northwind_reports::{ReportParams, ResultSet, Value};
use rust_decimal::Decimal;
use std::str::FromStr;

#[path = "../common/mod.rs"]
mod common;

fn run(id: &str) -> ResultSet {
    common::runner().run(id).unwrap()
}

fn run_with(id: &str, params: ReportParams) -> ResultSet {
    common::runner_with(params).run(id).unwrap()
}

fn texts(result: &ResultSet, column: &str) -> Vec<String> {
    result
        .column(column)
        .iter()
        .map(|v| match v {
            Value::Text(s) => s.clone(),
            other => panic!("{column}: expected text, got {other:?}"),
        })
        .collect()
}

fn ints(result: &ResultSet, column: &str) -> Vec<i64> {
    result
        .column(column)
        .iter()
        .map(|v| {
            v.as_i64()
                .unwrap_or_else(|| panic!("{column}: expected integer, got {v:?}"))
        })
        .collect()
}

fn decimals(result: &ResultSet, column: &str) -> Vec<Decimal> {
    result
        .column(column)
        .iter()
        .map(|v| {
            v.as_decimal()
                .unwrap_or_else(|| panic!("{column}: expected number, got {v:?}"))
        })
        .collect()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_employees_by_city_fills_missing_city() {
    let result = run("task_1_1");
    assert_eq!(ints(&result, "EmployeeID"), vec![1, 2, 3, 4]);
    assert_eq!(
        texts(&result, "City"),
        vec!["Seattle", "Tacoma", "Unspecified", "Unspecified"]
    );
    assert_eq!(
        texts(&result, "Employee Full Name")[2..],
        ["Janet Leverling", "Steven Buchanan"]
    );
}

#[test]
fn test_order_totals_and_discount_share() {
    let result = run("task_1_2");
    assert_eq!(
        ints(&result, "Order Id"),
        vec![10254, 10253, 10252, 10251, 10250, 10249, 10248]
    );
    let totals = decimals(&result, "Order Total Price");
    let discounts = decimals(&result, "Total Order Discount, %");
    assert_eq!(totals[3], dec("60"));
    assert_eq!(discounts[3], dec("5"));
    assert_eq!(totals[6], dec("100"));
    assert_eq!(discounts[6], dec("5"));
    assert_eq!(discounts[5], Decimal::ZERO);
}

#[test]
fn test_customers_without_fax_see_every_missing_form() {
    let result = run("task_1_3");
    assert_eq!(
        texts(&result, "CustomerID"),
        vec!["ANATR", "BERGS", "BONAP", "FRANK"]
    );

    let params = ReportParams {
        fax_country: Some("Germany".into()),
        ..ReportParams::default()
    };
    let result = run_with("task_1_3", params);
    assert_eq!(texts(&result, "CustomerID"), vec!["FRANK"]);
}

#[test]
fn test_customer_share_uses_bound_total() {
    let result = run("task_1_4");
    assert_eq!(
        texts(&result, "Customer Id"),
        vec!["ALFKI", "BERGS", "ANATR", "BONAP", "ZZZZZ"]
    );
    assert_eq!(ints(&result, "Total number of Orders"), vec![2, 2, 1, 1, 1]);
    let shares = decimals(&result, "% of all orders");
    assert_eq!(shares[0], dec("28.57143"));
    assert_eq!(shares[4], dec("14.28571"));
    let total: Decimal = shares.iter().copied().sum();
    assert!((total - Decimal::from(100)).abs() < dec("0.0001"));
}

#[test]
fn test_products_by_initial() {
    let result = run("task_1_5");
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Alice Mutton", "Boston Crab", "Chai"]
    );
}

#[test]
fn test_category_and_supplier_join_drops_dangling_supplier() {
    let result = run("task_1_6");
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Alice Mutton", "Boston Crab", "Chai", "Guarana"]
    );
    assert_eq!(
        texts(&result, "SupplierCompanyName"),
        vec![
            "Exotic Liquids",
            "New Orleans Cajun",
            "Exotic Liquids",
            "New Orleans Cajun"
        ]
    );
}

#[test]
fn test_employees_without_manager_show_placeholder() {
    let result = run("task_1_7");
    assert_eq!(texts(&result, "FullName")[0], "Ms. Nancy Davolio");
    assert_eq!(
        texts(&result, "ReportsTo"),
        vec!["Andrew Fuller", "-", "Andrew Fuller", "Andrew Fuller"]
    );
}

#[test]
fn test_products_per_category_skips_empty_categories() {
    let result = run("task_1_8");
    assert_eq!(
        texts(&result, "CategoryName"),
        vec!["Beverages", "Condiments"]
    );
    assert_eq!(ints(&result, "TotalNumberOfProducts"), vec![3, 2]);
}

#[test]
fn test_contacts_by_pattern() {
    let result = run("task_1_9");
    assert_eq!(texts(&result, "CustomerID"), vec!["ANATR", "BONAP"]);

    let params = ReportParams {
        contact_fourth: 'd',
        ..ReportParams::default()
    };
    let result = run_with("task_1_9", params);
    assert_eq!(texts(&result, "ContactName"), vec!["Fred"]);
}

#[test]
fn test_discontinued_products() {
    let result = run("task_1_10");
    assert_eq!(ints(&result, "ProductID"), vec![2, 4]);
}

#[test]
fn test_price_range_is_inclusive() {
    let result = run("task_1_11");
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Alice Mutton", "Chai", "Boston Crab"]
    );
    assert_eq!(
        decimals(&result, "UnitPrice"),
        vec![dec("5"), dec("10"), dec("15")]
    );
}

#[test]
fn test_most_expensive_products_come_back_ascending() {
    let result = run("task_1_12");
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Guarana", "Alice Mutton", "Chai", "Boston Crab", "Zaanse koeken"]
    );

    let params = ReportParams {
        top_products: 2,
        ..ReportParams::default()
    };
    let result = run_with("task_1_12", params);
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Boston Crab", "Zaanse koeken"]
    );
}

#[test]
fn test_current_vs_discontinued_is_one_row() {
    let result = run("task_1_13");
    assert_eq!(result.len(), 1);
    assert_eq!(ints(&result, "TotalOfCurrentProducts"), vec![5]);
    assert_eq!(ints(&result, "TotalOfDiscontinuedProducts"), vec![2]);
}

#[test]
fn test_understocked_products() {
    let result = run("task_1_14");
    assert_eq!(texts(&result, "ProductName"), vec!["Boston Crab", "Guarana"]);
}

#[test]
fn test_orders_per_month_has_every_month() {
    let result = run("task_1_15");
    assert_eq!(result.len(), 1);
    assert_eq!(result.columns.len(), 12);
    assert_eq!(ints(&result, "January"), vec![1]);
    assert_eq!(ints(&result, "February"), vec![0]);
    assert_eq!(ints(&result, "March"), vec![2]);
    assert_eq!(ints(&result, "December"), vec![0]);
}

#[test]
fn test_orders_per_month_for_an_empty_year() {
    let params = ReportParams {
        monthly_orders_year: 1990,
        ..ReportParams::default()
    };
    let result = run_with("task_1_15", params);
    assert_eq!(result.len(), 1);
    for month in result.columns.clone() {
        assert_eq!(ints(&result, &month), vec![0], "{month}");
    }
}

#[test]
fn test_orders_with_postal_code() {
    let result = run("task_1_16");
    assert_eq!(
        ints(&result, "OrderID"),
        vec![10248, 10251, 10252, 10253, 10254]
    );
}

#[test]
fn test_average_price_per_category() {
    let result = run("task_1_17");
    assert_eq!(
        texts(&result, "CategoryName"),
        vec!["Condiments", "Beverages"]
    );
    assert_eq!(
        decimals(&result, "AvgPrice"),
        vec![dec("17.5"), dec("6.5")]
    );
}

#[test]
fn test_orders_per_day_collapses_time_of_day() {
    let result = run("task_1_18");
    assert_eq!(
        texts(&result, "Order Date"),
        vec!["1998-01-05", "1998-02-10"]
    );
    assert_eq!(ints(&result, "Total Number of Orders"), vec![2, 1]);
}

#[test]
fn test_revenue_threshold() {
    let result = run("task_1_19");
    assert_eq!(texts(&result, "CustomerID"), vec!["ANATR"]);
    assert_eq!(
        decimals(&result, "TotalOrdersAmount, $"),
        vec![dec("15000")]
    );

    let params = ReportParams {
        revenue_threshold: Decimal::from(100),
        ..ReportParams::default()
    };
    let result = run_with("task_1_19", params);
    assert_eq!(texts(&result, "CustomerID"), vec!["ANATR", "ALFKI"]);
    assert_eq!(
        decimals(&result, "TotalOrdersAmount, $"),
        vec![dec("15000"), dec("110")]
    );
}

#[test]
fn test_top_employee() {
    let result = run("task_1_20");
    assert_eq!(result.len(), 1);
    assert_eq!(ints(&result, "EmployeeID"), vec![3]);
    assert_eq!(texts(&result, "Employee Full Name"), vec!["Janet Leverling"]);
    assert_eq!(decimals(&result, "Amount, $"), vec![dec("15000")]);
}

#[test]
fn test_largest_order() {
    let result = run("task_1_21");
    assert_eq!(ints(&result, "OrderID"), vec![10249]);
    assert_eq!(
        decimals(&result, "Maximum Purchase Amount, $"),
        vec![dec("15000")]
    );
}

#[test]
fn test_priciest_product_per_customer_breaks_ties_by_name() {
    let result = run("task_1_22");
    assert_eq!(
        texts(&result, "CustomerID"),
        vec!["BERGS", "ANATR", "BONAP", "ALFKI"]
    );
    assert_eq!(
        texts(&result, "ProductName"),
        vec!["Zaanse koeken", "Boston Crab", "Boston Crab", "Alice Mutton"]
    );
    assert_eq!(
        decimals(&result, "PricePerItem"),
        vec![dec("20"), dec("15"), dec("15"), dec("10")]
    );
}

#[test]
fn test_run_all_follows_registry_order() {
    let results = common::runner().run_all().unwrap();
    assert_eq!(results.len(), 22);
    assert_eq!(results[0].report, "task_1_1");
    assert_eq!(results[21].report, "task_1_22");
}

#[test]
fn test_repeated_runs_are_identical() {
    let runner = common::runner();
    let first = runner.run_all().unwrap();
    let second = runner.run_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_before_is_invokable_and_repeatable() {
    let mut runner = common::runner();
    let indexes = runner.store().index_count();
    assert!(runner.invoke("before").unwrap().is_none());
    assert!(runner.invoke("before").unwrap().is_none());
    assert_eq!(runner.store().index_count(), indexes);
    assert!(runner.invoke("task_1_10").unwrap().is_some());
}

#[test]
fn test_unknown_report() {
    let err = common::runner().run("task_9_9").unwrap_err();
    assert!(matches!(err, ReportError::UnknownReport(id) if id == "task_9_9"));
}

#[test]
fn test_json_rows_follow_column_order() {
    let result = run("task_1_21");
    let json = serde_json::to_string(&result).unwrap();
    assert_eq!(
        json,
        r#"[{"OrderID":10249,"Maximum Purchase Amount, $":15000}]"#
    );
}
