use northwind_reports::report::{self, ReportParams};
use insta::assert_snapshot;
use northwind_reports::sql::{render_report, render_setup, Dialect, SqlDialect};
use sqlparser::dialect::{DuckDbDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

const DIALECTS: [Dialect; 3] = [Dialect::MySql, Dialect::Postgres, Dialect::DuckDb];

fn parse(sql: &str, dialect: Dialect) {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("{:?} rejected SQL: {}\n{}", dialect, e, sql);
    }
}

fn render(id: &str, dialect: Dialect) -> String {
    let def = report::find(id).unwrap();
    render_report(&def.plan(&ReportParams::default()), dialect).unwrap()
}

#[test]
fn test_every_report_parses_in_every_dialect() {
    for def in report::reports() {
        let plan = def.plan(&ReportParams::default());
        for dialect in DIALECTS {
            let sql = render_report(&plan, dialect)
                .unwrap_or_else(|e| panic!("{} ({:?}): {}", def.id, dialect, e));
            parse(&sql, dialect);
        }
    }
}

#[test]
fn test_setup_parses_in_every_dialect() {
    for dialect in DIALECTS {
        let statements = render_setup(dialect);
        assert_eq!(statements.len(), 12);
        for statement in &statements {
            parse(statement, dialect);
        }
    }
}

#[test]
fn test_mysql_setup_has_no_if_not_exists() {
    let statements = render_setup(Dialect::MySql);
    assert!(statements.iter().all(|s| !s.contains("IF NOT EXISTS")));
    assert!(statements
        .iter()
        .any(|s| s == "CREATE INDEX `idx_orders_customerid` ON `Orders` (`CustomerID`)"));
}

#[test]
fn test_output_columns_are_quoted_per_dialect() {
    let mysql = render("task_1_2", Dialect::MySql);
    assert!(mysql.contains("AS `Total Order Discount, %`"));
    let pg = render("task_1_2", Dialect::Postgres);
    assert!(pg.contains("AS \"Total Order Discount, %\""));
}

#[test]
fn test_share_report_inlines_total() {
    let sql = render("task_1_4", Dialect::Postgres);
    assert!(sql.contains("(SELECT\n  COUNT(*) AS \"total_orders\""));
}

#[test]
fn test_mysql_share_keeps_five_decimals() {
    let sql = render("task_1_4", Dialect::MySql);
    let cast = sql.find("CAST(").unwrap();
    let division = sql.find("AS DECIMAL(65,10))").unwrap();
    assert!(cast < division);
    parse(&sql, Dialect::MySql);
}

#[test]
fn test_manager_join_is_left_outer() {
    let sql = render("task_1_7", Dialect::MySql);
    assert!(sql.contains("LEFT JOIN `Employees` AS `manager`"));
    let sql = render("task_1_6", Dialect::MySql);
    assert!(!sql.contains("LEFT JOIN"));
}

#[test]
fn test_top_products_limits_before_resorting() {
    let params = ReportParams {
        top_products: 7,
        ..ReportParams::default()
    };
    let plan = report::find("task_1_12").unwrap().plan(&params);
    let sql = render_report(&plan, Dialect::DuckDb).unwrap();
    let limit = sql.find("LIMIT 7").unwrap();
    let outer_order = sql.rfind("ORDER BY").unwrap();
    assert!(limit < outer_order);
}

#[test]
fn test_priciest_product_ranks_rows() {
    for dialect in DIALECTS {
        let sql = render("task_1_22", dialect);
        assert!(sql.contains("ROW_NUMBER() OVER (PARTITION BY"), "{:?}", dialect);
    }
}

#[test]
fn test_fax_country_adds_a_condition() {
    let params = ReportParams {
        fax_country: Some("O'Higgins".into()),
        ..ReportParams::default()
    };
    let plan = report::find("task_1_3").unwrap().plan(&params);
    let sql = render_report(&plan, Dialect::Postgres).unwrap();
    assert!(sql.contains("'O''Higgins'"));
    parse(&sql, Dialect::Postgres);
}

#[test]
fn test_report_sql_snapshots() {
    for def in report::reports() {
        let plan = def.plan(&ReportParams::default());
        for dialect in DIALECTS {
            let sql = render_report(&plan, dialect).unwrap();
            assert_snapshot!(format!("{}_{}", def.id, dialect.name()), sql);
        }
    }
}

#[test]
fn test_setup_snapshots() {
    for dialect in DIALECTS {
        let sql = render_setup(dialect).join(";\n");
        assert_snapshot!(format!("setup_{}", dialect.name()), sql);
    }
}
