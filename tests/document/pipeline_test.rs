use insta::assert_snapshot;
use northwind_reports::document::{self, CommandError};
use northwind_reports::report::{self, ReportParams};
use northwind_reports::schema::Entity;
use northwind_reports::{Params, Value};
use serde_json::{json, Value as Json};

fn script(id: &str) -> document::DocumentScript {
    let def = report::find(id).unwrap();
    document::render_report(&def.plan(&ReportParams::default()))
}

fn stage_names(pipeline: &[Json]) -> Vec<String> {
    pipeline
        .iter()
        .map(|stage| {
            let object = stage.as_object().unwrap();
            assert_eq!(object.len(), 1, "stage has one operator: {stage}");
            object.keys().next().unwrap().clone()
        })
        .collect()
}

/// Every `$$name` string anywhere in the document.
fn variables_used(value: &Json, out: &mut Vec<String>) {
    match value {
        Json::String(s) => {
            if let Some(name) = s.strip_prefix("$$") {
                if name != "ROOT" {
                    out.push(name.to_string());
                }
            }
        }
        Json::Array(items) => items.iter().for_each(|v| variables_used(v, out)),
        Json::Object(map) => map.values().for_each(|v| variables_used(v, out)),
        _ => {}
    }
}

#[test]
fn test_every_stage_is_a_single_operator() {
    for def in report::reports() {
        let script = document::render_report(&def.plan(&ReportParams::default()));
        for name in stage_names(&script.main.pipeline) {
            assert!(name.starts_with('$'), "{}: {}", def.id, name);
        }
    }
}

#[test]
fn test_variables_are_declared() {
    for def in report::reports() {
        let script = document::render_report(&def.plan(&ReportParams::default()));
        let mut used = Vec::new();
        for stage in &script.main.pipeline {
            variables_used(stage, &mut used);
        }
        for name in used {
            assert!(
                script.main.variables.contains(&name),
                "{} uses undeclared ${}",
                def.id,
                name
            );
        }
    }
}

#[test]
fn test_lookups_target_collections() {
    let collections: Vec<&str> = Entity::ALL.iter().map(|e| e.collection_name()).collect();
    for def in report::reports() {
        let script = document::render_report(&def.plan(&ReportParams::default()));
        for stage in &script.main.pipeline {
            if let Some(lookup) = stage.get("$lookup") {
                let from = lookup["from"].as_str().unwrap();
                assert!(collections.contains(&from), "{}: {}", def.id, from);
            }
        }
    }
}

#[test]
fn test_missing_fax_matches_the_sentinel() {
    let script = script("task_1_3");
    assert_eq!(script.main.collection, "customers");
    assert_eq!(
        script.main.pipeline[0],
        json!({ "$match": { "$expr": {
            "$in": [{ "$ifNull": ["$Fax", null] }, [null, "NULL"]]
        } } })
    );
}

#[test]
fn test_manager_lookup_keeps_unmatched_employees() {
    let script = script("task_1_7");
    let unwind = script
        .main
        .pipeline
        .iter()
        .find_map(|stage| stage.get("$unwind"))
        .unwrap();
    assert_eq!(
        unwind,
        &json!({ "path": "$manager", "preserveNullAndEmptyArrays": true })
    );
}

#[test]
fn test_share_report_binds_total_orders() {
    let script = script("task_1_4");
    assert_eq!(script.preludes.len(), 1);
    assert_eq!(script.preludes[0].name, "total_orders");
    assert_eq!(script.main.variables, vec!["total_orders"]);

    let mut params = Params::new();
    params.insert("total_orders".into(), Value::Int(830));
    let command = script.main.to_command(&params).unwrap();
    assert_eq!(command["aggregate"], json!("orders"));
    assert_eq!(command["let"]["total_orders"], json!(830));
    assert_eq!(command["cursor"], json!({}));

    let err = script.main.to_command(&Params::new()).unwrap_err();
    assert!(matches!(err, CommandError::UnboundVariable(name) if name == "total_orders"));
}

#[test]
fn test_monthly_counts_survive_an_empty_year() {
    let script = script("task_1_15");
    let names = stage_names(&script.main.pipeline);
    assert_eq!(names, vec!["$match", "$facet", "$replaceRoot"]);
    let defaults = &script.main.pipeline[2]["$replaceRoot"]["newRoot"]["$ifNull"][1];
    assert_eq!(defaults["January"], json!(0));
    assert_eq!(defaults["December"], json!(0));
}

#[test]
fn test_priciest_product_keeps_first_row_per_customer() {
    let script = script("task_1_22");
    let names = stage_names(&script.main.pipeline);
    let group = names.iter().position(|n| n == "$group").unwrap();
    assert_eq!(names[group - 1], "$sort");
    assert_eq!(names[group + 1], "$replaceRoot");
    assert_eq!(
        script.main.pipeline[group]["$group"]["row"],
        json!({ "$first": "$$ROOT" })
    );
}

#[test]
fn test_largest_order_limits_to_one() {
    let script = script("task_1_21");
    assert_eq!(script.main.pipeline.last(), Some(&json!({ "$limit": 1 })));
}

#[test]
fn test_setup_creates_every_index() {
    let commands = document::render_setup();
    assert_eq!(commands.len(), 7);
    let total: usize = commands
        .iter()
        .map(|c| c["indexes"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 12);
    let details = commands
        .iter()
        .find(|c| c["createIndexes"] == json!("order-details"))
        .unwrap();
    assert_eq!(
        details["indexes"],
        json!([
            { "key": { "OrderID": 1 }, "name": "idx_orderdetails_orderid" },
            { "key": { "ProductID": 1 }, "name": "idx_orderdetails_productid" }
        ])
    );
}

#[test]
fn test_script_serializes() {
    let json = serde_json::to_value(script("task_1_13")).unwrap();
    assert_eq!(json["report"], json!("task_1_13"));
    assert_eq!(json["preludes"][0]["name"], json!("all_products"));
    assert_eq!(json["main"]["collection"], json!("products"));
}

#[test]
fn test_report_script_snapshots() {
    for def in report::reports() {
        let script = document::render_report(&def.plan(&ReportParams::default()));
        let rendered = serde_json::to_string_pretty(&script).unwrap();
        assert_snapshot!(format!("{}_document", def.id), rendered);
    }
}
