// ==========================================
// 表现层集成测试
// ==========================================
// 测试目标: 同一报表的 HTML 与 JSON 表现形式数据一致
// ==========================================


use backstock::domain::ReportFilter;
use backstock::presentation::render;
use backstock::{ReportApi, Representation};
use serde_json::Value;
use test_helpers::{begin, create_test_db, date, item, item_repo};

/// 收集 JSON 中的全部标量文本
fn scalars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| scalars(v, out)),
        Value::Array(items) => items.iter().for_each(|v| scalars(v, out)),
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Null => {}
    }
}

#[test]
fn test_report_html_and_json_carry_same_values() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = item_repo(&db_path);
    repo.insert(&item(1, "A", Some("produce"), "1.00", "0.50")).unwrap();
    repo.insert(&item(2, "B", Some("dairy"), "2.50", "1.00")).unwrap();

    let ctx = begin(&db_path, "report");
    let snapshot = ReportApi::new(&ctx)
        .generate_on(&ReportFilter::all(), date(2024, 6, 1))
        .unwrap();

    let json = render(&snapshot, Representation::Json).unwrap();
    let html = render(&snapshot, Representation::Html).unwrap();
    assert_eq!(json.content_type, "application/json");
    assert!(html.content_type.starts_with("text/html"));

    let parsed: Value = serde_json::from_str(&json.body).unwrap();
    assert_eq!(parsed["summary"]["total_price"], "3.50");
    assert_eq!(parsed["summary"]["item_count"], 2);

    let mut values = Vec::new();
    scalars(&parsed, &mut values);
    assert!(values.contains(&"3.50".to_string()));
    for value in values {
        assert!(html.body.contains(&value), "HTML 缺少值 {}", value);
    }
}

#[test]
fn test_search_view_escapes_markup_in_html() {
    let (_tmp, db_path) = create_test_db().unwrap();
    item_repo(&db_path)
        .insert(&item(1, "<b>Salsa</b> & Chips", Some("Snacks"), "3.00", "1.00"))
        .unwrap();

    let ctx = begin(&db_path, "search");
    let view = backstock::InventoryApi::new(&ctx).search("description", "salsa").unwrap();

    let html = render(&view, Representation::Html).unwrap().body;
    assert!(html.contains("&lt;b&gt;Salsa&lt;/b&gt; &amp; Chips"));
    assert!(!html.contains("<b>Salsa</b>"));

    let json: Value = serde_json::from_str(&render(&view, Representation::Json).unwrap().body).unwrap();
    assert_eq!(json["items"][0]["description"], "<b>Salsa</b> & Chips");
}
