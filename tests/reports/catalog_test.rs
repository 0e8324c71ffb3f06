use northwind_reports::report::{self, ReportParams, BEFORE};
use std::collections::HashSet;

#[test]
fn test_declared_columns_match_plans() {
    let params = ReportParams::default();
    for def in report::reports() {
        let plan = def.plan(&params);
        assert_eq!(plan.id, def.id);
        let declared: Vec<String> = def.columns.iter().map(|c| c.to_string()).collect();
        assert_eq!(plan.columns, declared, "{}", def.id);
    }
}

#[test]
fn test_ids_and_titles_are_unique() {
    let ids: HashSet<_> = report::reports().iter().map(|d| d.id).collect();
    let titles: HashSet<_> = report::reports().iter().map(|d| d.title).collect();
    assert_eq!(ids.len(), 22);
    assert_eq!(titles.len(), 22);
    assert!(!ids.contains(BEFORE));
}

#[test]
fn test_every_parameter_has_a_prelude() {
    for def in report::reports() {
        let plan = def.plan(&ReportParams::default());
        let bound: Vec<&str> = plan.preludes.iter().map(|p| p.name.as_str()).collect();
        for name in plan.plan.params() {
            assert!(bound.contains(&name), "{} leaves {} unbound", def.id, name);
        }
        for prelude in &plan.preludes {
            assert!(prelude.plan.params().is_empty(), "{}", def.id);
        }
    }
}

#[test]
fn test_defaults_shape_the_plans() {
    let default = report::find("task_1_12")
        .unwrap()
        .plan(&ReportParams::default());
    let wider = report::find("task_1_12").unwrap().plan(&ReportParams {
        top_products: 50,
        ..ReportParams::default()
    });
    assert_ne!(default.plan, wider.plan);
    assert_eq!(default.columns, wider.columns);
}

#[test]
fn test_params_load_from_toml() {
    let params: ReportParams = toml::from_str(
        r#"
daily_orders_year = 1997
name_prefixes = "XYZ"
fax_country = "Germany"
"#,
    )
    .unwrap();
    assert_eq!(params.daily_orders_year, 1997);
    assert_eq!(params.name_prefixes, "XYZ");
    assert_eq!(params.fax_country.as_deref(), Some("Germany"));
    assert_eq!(params.monthly_orders_year, 1997);
    assert_eq!(params.top_products, 20);
}
