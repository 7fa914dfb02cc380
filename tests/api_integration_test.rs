// ==========================================
// API 集成测试
// ==========================================
// 测试目标: 每次请求独立的 RequestContext 上的完整业务流程
// ==========================================


use backstock::api::ConfigApi;
use backstock::config::config_keys;
use backstock::importer::Upload;
use backstock::{ApiError, HealthApi, ImportApi, InventoryApi};
use test_helpers::{begin, create_test_db, item_repo, raw_item, test_state, write_csv};

#[test]
fn test_add_then_search_in_separate_requests() {
    let (_tmp, db_path) = create_test_db().unwrap();

    {
        let ctx = begin(&db_path, "add_item");
        InventoryApi::new(&ctx)
            .add_item(raw_item("42", "Oat Milk", "Dairy", "$4.29", "2.10"))
            .unwrap();
    }

    let ctx = begin(&db_path, "search");
    let view = InventoryApi::new(&ctx).search("identifier", "42").unwrap();

    assert_eq!(view.count, 1);
    assert_eq!(view.criterion, "id");
    let item = &view.items[0];
    assert_eq!(item.description, "Oat Milk");
    assert_eq!(item.department.as_deref(), Some("Dairy"));
    assert_eq!(item.price.to_string(), "4.29");
    assert_eq!(item.cost.to_string(), "2.10");
}

#[test]
fn test_validation_errors_are_client_errors() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = begin(&db_path, "search");
    let api = InventoryApi::new(&ctx);

    let err = api.search("flavour", "sweet").unwrap_err();
    assert_eq!(err.kind(), "unknown_criterion");
    assert!(err.is_client_error());

    let err = api
        .add_item(raw_item("1", "Tea", "Beverages", "ten", "1.00"))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidItem(_)));
    let view = err.to_view();
    assert_eq!(view.error, "validation");
    assert!(view.reasons.iter().any(|r| r.field == "price"));

    assert_eq!(api.search("description", "tea").unwrap().count, 0);
}

#[tokio::test]
async fn test_upload_then_list_batches_and_rejections() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let ctx = begin(&db_path, "import");
    let api = ImportApi::new(&ctx);

    let csv = "id,description,shelf_life,price,unit,x_for,cost\n\
               1,Tea,1y,4.50,ea,1,2.00\n\
               2,,1y,4.50,ea,1,2.00\n";
    let result = api.import_upload(Upload::new("tea.csv", csv)).await.unwrap();
    assert_eq!(result.summary.inserted, 1);
    assert_eq!(result.summary.rejected, 1);

    let batches = api.list_batches(10).await.unwrap();
    assert_eq!(batches.batches.len(), 1);
    assert_eq!(batches.batches[0].file_name.as_deref(), Some("tea.csv"));
    assert_eq!(batches.batches[0].rejected_rows, 1);

    let rejections = api.get_rejections(&result.batch.batch_id).await.unwrap();
    assert_eq!(rejections.rejections.len(), 1);
    assert_eq!(rejections.rejections[0].field, "description");
    assert_eq!(rejections.rejections[0].row_number, 3);

    let err = api
        .import_upload(Upload::new("tea.pdf", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "import");
}

#[tokio::test]
async fn test_import_files_keeps_going_after_a_bad_file() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let header = "id,description,shelf_life,price,unit,x_for,cost\n";
    let first = write_csv(dir.path(), "first.csv", &format!("{}1,Tea,1y,4.50,ea,1,2.00\n", header));
    let second = write_csv(dir.path(), "second.csv", &format!("{}2,Salt,2y,0.99,ea,1,0.20\n", header));
    let missing = dir.path().join("missing.csv");

    let ctx = begin(&db_path, "import");
    let results = ImportApi::new(&ctx)
        .import_files(vec![first, missing, second])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().summary.inserted, 1);
    let err = results[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), "import");
    assert!(err.is_client_error());
    assert_eq!(results[2].as_ref().unwrap().summary.inserted, 1);
    assert_eq!(item_repo(&db_path).count().unwrap(), 2);
}

#[test]
fn test_config_change_applies_to_next_request() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let ctx = begin(&db_path, "config");
    ConfigApi::new(&ctx)
        .update_config(config_keys::IMPORT_DUPLICATE_POLICY, "reject")
        .unwrap();
    assert_eq!(ctx.config().duplicate_policy.to_string(), "upsert");
    drop(ctx);

    let ctx = begin(&db_path, "config");
    assert_eq!(ctx.config().duplicate_policy.to_string(), "reject");
}

#[tokio::test]
async fn test_health_and_diagnostics() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = test_state(&db_path);
    assert!(state.init_database().unwrap());

    {
        let ctx = begin(&db_path, "add_item");
        InventoryApi::new(&ctx)
            .add_item(raw_item("5", "Salt", "Pantry", "0.99", "0.20"))
            .unwrap();
    }

    let ctx = state.begin_request("diagnostics").unwrap();
    let api = HealthApi::new(&state, &ctx).unwrap();

    let health = api.health().unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.schema_ok);
    assert_eq!(health.item_count, 1);
    assert_eq!(health.environment, "testing");

    let diagnostics = api.diagnostics().await.unwrap();
    assert_eq!(diagnostics.database_path, db_path);
    assert_eq!(diagnostics.config["report_top_n"], 10);
    assert!(diagnostics.recent_batches.is_empty());
}
