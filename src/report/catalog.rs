//! The report registry.
//!
//! Every report is a plan built from [`ReportParams`]. Column lists here are
//! the exact, ordered output columns; `tests/reports/catalog_test.rs` checks
//! them against what each plan produces.

use crate::plan::{concat, field, lit, param, Aggregate, Expr, Plan, ReportPlan, SortKey};
use crate::schema::Entity;

use super::params::ReportParams;

/// Name of the setup operation that provisions indexes.
pub const BEFORE: &str = "before";

/// A registered report.
#[derive(Clone, Copy)]
pub struct ReportDef {
    pub id: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    build: fn(&'static str, &ReportParams) -> ReportPlan,
}

impl ReportDef {
    /// Build the report's plan for the given parameters.
    pub fn plan(&self, params: &ReportParams) -> ReportPlan {
        (self.build)(self.id, params)
    }
}

/// Look up a report by id.
pub fn find(id: &str) -> Option<&'static ReportDef> {
    REPORTS.iter().find(|r| r.id == id)
}

/// Every report, in registry order.
pub fn reports() -> &'static [ReportDef] {
    REPORTS
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static REPORTS: &[ReportDef] = &[
    ReportDef {
        id: "task_1_1",
        title: "Employees by city",
        columns: &["EmployeeID", "Employee Full Name", "Title", "City"],
        build: employees_by_city,
    },
    ReportDef {
        id: "task_1_2",
        title: "Order totals and discount",
        columns: &["Order Id", "Order Total Price", "Total Order Discount, %"],
        build: order_totals,
    },
    ReportDef {
        id: "task_1_3",
        title: "Customers without fax",
        columns: &["CustomerID", "CompanyName"],
        build: customers_without_fax,
    },
    ReportDef {
        id: "task_1_4",
        title: "Customer share of orders",
        columns: &["Customer Id", "Total number of Orders", "% of all orders"],
        build: customer_order_share,
    },
    ReportDef {
        id: "task_1_5",
        title: "Products by initial letter",
        columns: &["ProductID", "ProductName", "QuantityPerUnit"],
        build: products_by_initial,
    },
    ReportDef {
        id: "task_1_6",
        title: "Products with category and supplier",
        columns: &["ProductName", "CategoryName", "SupplierCompanyName"],
        build: products_with_category_and_supplier,
    },
    ReportDef {
        id: "task_1_7",
        title: "Employees and managers",
        columns: &["EmployeeID", "FullName", "ReportsTo"],
        build: employees_and_managers,
    },
    ReportDef {
        id: "task_1_8",
        title: "Products per category",
        columns: &["CategoryName", "TotalNumberOfProducts"],
        build: products_per_category,
    },
    ReportDef {
        id: "task_1_9",
        title: "Contacts by name pattern",
        columns: &["CustomerID", "ContactName"],
        build: contacts_by_pattern,
    },
    ReportDef {
        id: "task_1_10",
        title: "Discontinued products",
        columns: &["ProductID", "ProductName"],
        build: discontinued_products,
    },
    ReportDef {
        id: "task_1_11",
        title: "Products in price range",
        columns: &["ProductName", "UnitPrice"],
        build: products_in_price_range,
    },
    ReportDef {
        id: "task_1_12",
        title: "Most expensive products",
        columns: &["ProductName", "UnitPrice"],
        build: most_expensive_products,
    },
    ReportDef {
        id: "task_1_13",
        title: "Current vs discontinued products",
        columns: &["TotalOfCurrentProducts", "TotalOfDiscontinuedProducts"],
        build: current_vs_discontinued,
    },
    ReportDef {
        id: "task_1_14",
        title: "Stock below units on order",
        columns: &["ProductName", "UnitsOnOrder", "UnitsInStock"],
        build: understocked_products,
    },
    ReportDef {
        id: "task_1_15",
        title: "Orders per month",
        columns: &MONTHS,
        build: orders_per_month,
    },
    ReportDef {
        id: "task_1_16",
        title: "Orders with postal code",
        columns: &["OrderID", "CustomerID", "ShipCountry"],
        build: orders_with_postal_code,
    },
    ReportDef {
        id: "task_1_17",
        title: "Average price per category",
        columns: &["CategoryName", "AvgPrice"],
        build: average_price_per_category,
    },
    ReportDef {
        id: "task_1_18",
        title: "Orders per day",
        columns: &["Order Date", "Total Number of Orders"],
        build: orders_per_day,
    },
    ReportDef {
        id: "task_1_19",
        title: "Customers above revenue threshold",
        columns: &["CustomerID", "CompanyName", "TotalOrdersAmount, $"],
        build: top_customers,
    },
    ReportDef {
        id: "task_1_20",
        title: "Most valuable employee",
        columns: &["EmployeeID", "Employee Full Name", "Amount, $"],
        build: top_employee,
    },
    ReportDef {
        id: "task_1_21",
        title: "Maximum order amount",
        columns: &["OrderID", "Maximum Purchase Amount, $"],
        build: largest_order,
    },
    ReportDef {
        id: "task_1_22",
        title: "Most expensive product per customer",
        columns: &["CustomerID", "CompanyName", "ProductName", "PricePerItem"],
        build: priciest_product_per_customer,
    },
];

fn line_amount() -> Aggregate {
    Aggregate::Sum(field("line.UnitPrice").mul(field("line.Quantity")))
}

/// Pass fields through unchanged.
fn keep<'a>(names: &[&'a str]) -> Vec<(&'a str, Expr)> {
    names.iter().map(|name| (*name, field(name))).collect()
}

fn employees_by_city(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Employees)
        .project(vec![
            ("EmployeeID", field("EmployeeID")),
            (
                "Employee Full Name",
                concat(vec![field("FirstName"), lit(" "), field("LastName")]),
            ),
            ("Title", field("Title")),
            ("City", field("City").if_missing("Unspecified")),
        ])
        .sort(vec![SortKey::asc("City"), SortKey::asc("Employee Full Name")]);
    ReportPlan::new(id, plan)
}

fn order_totals(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .group(
            vec![("Order Id", field("OrderID"))],
            vec![
                ("gross", line_amount()),
                (
                    "discount",
                    Aggregate::Sum(field("line.Discount").mul(field("line.Quantity"))),
                ),
            ],
        )
        .project(vec![
            ("Order Id", field("Order Id")),
            ("Order Total Price", field("gross").round(3)),
            (
                "Total Order Discount, %",
                field("discount").mul(100).div(field("gross")).round(3),
            ),
        ])
        .sort(vec![SortKey::desc("Order Id")]);
    ReportPlan::new(id, plan)
}

fn customers_without_fax(id: &'static str, params: &ReportParams) -> ReportPlan {
    let mut predicate = field("Fax").is_missing();
    if let Some(country) = &params.fax_country {
        predicate = predicate.and(field("Country").eq(lit(country.as_str())));
    }
    let plan = Plan::scan(Entity::Customers)
        .filter(predicate)
        .project(vec![
            ("CustomerID", field("CustomerID")),
            ("CompanyName", field("CompanyName")),
        ])
        .sort(vec![SortKey::asc("CustomerID")]);
    ReportPlan::new(id, plan)
}

fn customer_order_share(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .group(
            vec![("Customer Id", field("CustomerID"))],
            vec![("Total number of Orders", Aggregate::Count)],
        )
        .project(vec![
            ("Customer Id", field("Customer Id")),
            ("Total number of Orders", field("Total number of Orders")),
            (
                "% of all orders",
                field("Total number of Orders")
                    .mul(100)
                    .div(param("total_orders"))
                    .round(5),
            ),
        ])
        .sort(vec![
            SortKey::desc("% of all orders"),
            SortKey::asc("Customer Id"),
        ]);
    ReportPlan::new(id, plan).with_scalar(
        "total_orders",
        Plan::scan(Entity::Orders).group(vec![], vec![("total_orders", Aggregate::Count)]),
    )
}

fn products_by_initial(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .filter(field("ProductName").starts_with_any(params.name_prefixes.chars()))
        .project(vec![
            ("ProductID", field("ProductID")),
            ("ProductName", field("ProductName")),
            ("QuantityPerUnit", field("QuantityPerUnit")),
        ])
        .sort(vec![SortKey::asc("ProductName")]);
    ReportPlan::new(id, plan)
}

fn products_with_category_and_supplier(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .lookup(Entity::Categories, "CategoryID", "CategoryID", "category")
        .lookup(Entity::Suppliers, "SupplierID", "SupplierID", "supplier")
        .project(vec![
            ("ProductName", field("ProductName")),
            ("CategoryName", field("category.CategoryName")),
            ("SupplierCompanyName", field("supplier.CompanyName")),
        ])
        .sort(vec![
            SortKey::asc("ProductName"),
            SortKey::asc("SupplierCompanyName"),
        ]);
    ReportPlan::new(id, plan)
}

fn employees_and_managers(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Employees)
        .left_lookup(Entity::Employees, "ReportsTo", "EmployeeID", "manager")
        .project(vec![
            ("EmployeeID", field("EmployeeID")),
            (
                "FullName",
                concat(vec![
                    field("TitleOfCourtesy"),
                    lit(" "),
                    field("FirstName"),
                    lit(" "),
                    field("LastName"),
                ]),
            ),
            (
                "ReportsTo",
                concat(vec![
                    field("manager.FirstName"),
                    lit(" "),
                    field("manager.LastName"),
                ])
                .if_missing("-"),
            ),
        ])
        .sort(vec![SortKey::asc("EmployeeID")]);
    ReportPlan::new(id, plan)
}

fn products_per_category(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Categories)
        .lookup(Entity::Products, "CategoryID", "CategoryID", "product")
        .group(
            vec![
                ("CategoryID", field("CategoryID")),
                ("CategoryName", field("CategoryName")),
            ],
            vec![("TotalNumberOfProducts", Aggregate::Count)],
        )
        .project(keep(&["CategoryName", "TotalNumberOfProducts"]))
        .sort(vec![SortKey::asc("CategoryName")]);
    ReportPlan::new(id, plan)
}

fn contacts_by_pattern(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Customers)
        .filter(
            field("ContactName")
                .chars_at(vec![(0, params.contact_first), (3, params.contact_fourth)]),
        )
        .project(keep(&["CustomerID", "ContactName"]))
        .sort(vec![SortKey::asc("CustomerID")]);
    ReportPlan::new(id, plan)
}

fn discontinued_products(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .filter(field("Discontinued").eq(1))
        .project(keep(&["ProductID", "ProductName"]))
        .sort(vec![SortKey::asc("ProductID")]);
    ReportPlan::new(id, plan)
}

fn products_in_price_range(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .filter(field("UnitPrice").between(params.min_price, params.max_price))
        .project(keep(&["ProductName", "UnitPrice"]))
        .sort(vec![SortKey::asc("UnitPrice"), SortKey::asc("ProductName")]);
    ReportPlan::new(id, plan)
}

fn most_expensive_products(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .project(keep(&["ProductName", "UnitPrice"]))
        .sort(vec![SortKey::desc("UnitPrice"), SortKey::asc("ProductName")])
        .limit(params.top_products)
        .sort(vec![SortKey::asc("UnitPrice"), SortKey::asc("ProductName")]);
    ReportPlan::new(id, plan)
}

fn current_vs_discontinued(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .filter(field("Discontinued").eq(1))
        .group(vec![], vec![("discontinued", Aggregate::Count)])
        .project(vec![
            ("TotalOfCurrentProducts", param("all_products")),
            ("TotalOfDiscontinuedProducts", field("discontinued")),
        ]);
    ReportPlan::new(id, plan).with_scalar(
        "all_products",
        Plan::scan(Entity::Products).group(vec![], vec![("all_products", Aggregate::Count)]),
    )
}

fn understocked_products(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .filter(field("UnitsInStock").lt(field("UnitsOnOrder")))
        .project(keep(&["ProductName", "UnitsOnOrder", "UnitsInStock"]))
        .sort(vec![SortKey::asc("ProductName")]);
    ReportPlan::new(id, plan)
}

fn orders_per_month(id: &'static str, params: &ReportParams) -> ReportPlan {
    let buckets = MONTHS
        .iter()
        .zip(1i64..)
        .map(|(name, month)| {
            (
                *name,
                Aggregate::CountIf(field("OrderDate").month().eq(month)),
            )
        })
        .collect();
    let plan = Plan::scan(Entity::Orders)
        .filter(field("OrderDate").year().eq(params.monthly_orders_year))
        .group(vec![], buckets);
    ReportPlan::new(id, plan)
}

fn orders_with_postal_code(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .filter(field("ShipPostalCode").is_present())
        .project(keep(&["OrderID", "CustomerID", "ShipCountry"]))
        .sort(vec![SortKey::asc("OrderID")]);
    ReportPlan::new(id, plan)
}

fn average_price_per_category(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Products)
        .lookup(Entity::Categories, "CategoryID", "CategoryID", "category")
        .group(
            vec![("CategoryName", field("category.CategoryName"))],
            vec![("average", Aggregate::Avg(field("UnitPrice")))],
        )
        .project(vec![
            ("CategoryName", field("CategoryName")),
            ("AvgPrice", field("average").round(2)),
        ])
        .sort(vec![SortKey::desc("AvgPrice"), SortKey::asc("CategoryName")]);
    ReportPlan::new(id, plan)
}

fn orders_per_day(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .filter(field("OrderDate").year().eq(params.daily_orders_year))
        .group(
            vec![("Order Date", field("OrderDate").date_string())],
            vec![("Total Number of Orders", Aggregate::Count)],
        )
        .sort(vec![SortKey::asc("Order Date")]);
    ReportPlan::new(id, plan)
}

fn top_customers(id: &'static str, params: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::Customers, "CustomerID", "CustomerID", "customer")
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .group(
            vec![
                ("CustomerID", field("customer.CustomerID")),
                ("CompanyName", field("customer.CompanyName")),
            ],
            vec![("amount", line_amount())],
        )
        .filter(field("amount").gt(params.revenue_threshold))
        .project(vec![
            ("CustomerID", field("CustomerID")),
            ("CompanyName", field("CompanyName")),
            ("TotalOrdersAmount, $", field("amount").round(2)),
        ])
        .sort(vec![
            SortKey::desc("TotalOrdersAmount, $"),
            SortKey::asc("CustomerID"),
        ]);
    ReportPlan::new(id, plan)
}

fn top_employee(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::Employees, "EmployeeID", "EmployeeID", "employee")
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .group(
            vec![
                ("EmployeeID", field("employee.EmployeeID")),
                (
                    "Employee Full Name",
                    concat(vec![
                        field("employee.FirstName"),
                        lit(" "),
                        field("employee.LastName"),
                    ]),
                ),
            ],
            vec![("amount", line_amount())],
        )
        .project(vec![
            ("EmployeeID", field("EmployeeID")),
            ("Employee Full Name", field("Employee Full Name")),
            ("Amount, $", field("amount").round(2)),
        ])
        .sort(vec![SortKey::desc("Amount, $"), SortKey::asc("EmployeeID")])
        .limit(1);
    ReportPlan::new(id, plan)
}

fn largest_order(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .group(
            vec![("OrderID", field("OrderID"))],
            vec![("amount", line_amount())],
        )
        .project(vec![
            ("OrderID", field("OrderID")),
            ("Maximum Purchase Amount, $", field("amount").round(2)),
        ])
        .sort(vec![
            SortKey::desc("Maximum Purchase Amount, $"),
            SortKey::asc("OrderID"),
        ])
        .limit(1);
    ReportPlan::new(id, plan)
}

fn priciest_product_per_customer(id: &'static str, _: &ReportParams) -> ReportPlan {
    let plan = Plan::scan(Entity::Orders)
        .lookup(Entity::Customers, "CustomerID", "CustomerID", "customer")
        .lookup(Entity::OrderDetails, "OrderID", "OrderID", "line")
        .lookup(Entity::Products, "line.ProductID", "ProductID", "product")
        .project(vec![
            ("CustomerID", field("customer.CustomerID")),
            ("CompanyName", field("customer.CompanyName")),
            ("ProductName", field("product.ProductName")),
            ("PricePerItem", field("line.UnitPrice")),
        ])
        .first_per_group(
            vec!["CustomerID"],
            vec![SortKey::desc("PricePerItem"), SortKey::asc("ProductName")],
        )
        .sort(vec![
            SortKey::desc("PricePerItem"),
            SortKey::asc("CompanyName"),
            SortKey::asc("ProductName"),
        ]);
    ReportPlan::new(id, plan)
}
