// ==========================================
// 报表集成测试
// ==========================================
// 测试目标: 仓储 → 聚合的完整报表流程
// ==========================================


use backstock::domain::{ReportFilter, ReportSection};
use backstock::ReportApi;
use rust_decimal::Decimal;
use test_helpers::{begin, create_test_db, date, item, item_repo, money};

#[test]
fn test_two_item_example() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = item_repo(&db_path);
    repo.insert(&item(1, "A", Some("produce"), "1.00", "0.50")).unwrap();
    repo.insert(&item(2, "B", Some("dairy"), "2.50", "1.00")).unwrap();

    let ctx = begin(&db_path, "report");
    let snapshot = ReportApi::new(&ctx)
        .generate_on(&ReportFilter::all(), date(2024, 6, 1))
        .unwrap();

    assert_eq!(snapshot.summary.item_count, 2);
    assert_eq!(snapshot.summary.total_price, money("3.50"));
    assert_eq!(snapshot.summary.total_price.to_string(), "3.50");

    let subtotal = |name: &str| {
        snapshot
            .departments
            .iter()
            .find(|d| d.department == name)
            .map(|d| d.total_price)
            .unwrap()
    };
    assert_eq!(subtotal("produce"), money("1.00"));
    assert_eq!(subtotal("dairy"), money("2.50"));
}

#[test]
fn test_department_subtotals_sum_to_totals() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = item_repo(&db_path);
    let rows = [
        (1, "Kale", Some("Produce"), "2.19", "1.05"),
        (2, "Leeks", Some("Produce"), "1.49", "0.70"),
        (3, "Brie", Some("Dairy"), "7.99", "4.20"),
        (4, "Matches", None, "0.99", "0.15"),
        (5, "Cream", Some("Dairy"), "2.29", "1.30"),
    ];
    for (id, description, department, price, cost) in rows {
        repo.insert(&item(id, description, department, price, cost)).unwrap();
    }

    let ctx = begin(&db_path, "report");
    let snapshot = ReportApi::new(&ctx)
        .generate_on(&ReportFilter::all(), date(2024, 6, 1))
        .unwrap();

    let price_sum: Decimal = snapshot.departments.iter().map(|d| d.total_price).sum();
    let cost_sum: Decimal = snapshot.departments.iter().map(|d| d.total_cost).sum();
    let count_sum: usize = snapshot.departments.iter().map(|d| d.item_count).sum();

    assert_eq!(price_sum, snapshot.summary.total_price);
    assert_eq!(cost_sum, snapshot.summary.total_cost);
    assert_eq!(count_sum, snapshot.summary.item_count);
    assert_eq!(snapshot.summary.total_price, money("14.95"));
    assert_eq!(snapshot.summary.total_cost, money("7.40"));
    assert!(snapshot.departments.iter().any(|d| d.department == "Uncategorized"));
}

#[test]
fn test_department_filter_and_sections() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = item_repo(&db_path);
    repo.insert(&item(1, "Kale", Some("Produce"), "2.00", "1.00")).unwrap();
    repo.insert(&item(2, "Brie", Some("Dairy"), "8.00", "4.00")).unwrap();

    let ctx = begin(&db_path, "report");
    let filter = ReportFilter {
        department: Some("dairy".to_string()),
        sections: vec![ReportSection::TopPrice],
    };
    let snapshot = ReportApi::new(&ctx).generate_on(&filter, date(2024, 6, 1)).unwrap();

    assert_eq!(snapshot.summary.item_count, 1);
    assert_eq!(snapshot.summary.total_price, money("8.00"));
    assert_eq!(snapshot.department_filter.as_deref(), Some("dairy"));
    assert_eq!(snapshot.top_price_items.len(), 1);
    assert_eq!(snapshot.top_price_items[0].id, 2);
    assert!(snapshot.stock_health.is_none());
    assert!(snapshot.age_distribution.is_none());
    assert!(snapshot.top_value_items.is_empty());
}

#[test]
fn test_empty_inventory_report() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = begin(&db_path, "report");

    let snapshot = ReportApi::new(&ctx)
        .generate_on(&ReportFilter::all(), date(2024, 6, 1))
        .unwrap();

    assert_eq!(snapshot.summary.item_count, 0);
    assert_eq!(snapshot.summary.total_price.to_string(), "0.00");
    assert!(snapshot.departments.is_empty());
}
