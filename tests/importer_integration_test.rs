// ==========================================
// ItemImporter 集成测试
// ==========================================
// 测试目标: 验证完整的商品导入流程（文件 → 解析 → 校验 → 入库 → 批次记录）
// ==========================================


use backstock::config::ConfigSnapshot;
use backstock::domain::{DuplicatePolicy, RowStatus};
use backstock::importer::{ImportError, ItemImporter, ItemImporterImpl};
use backstock::logging;
use backstock::repository::{ItemImportRepository, ItemImportRepositoryImpl};
use test_helpers::{create_test_db, fixture, item_repo, write_csv};

/// 创建测试用的 ItemImporter 实例
fn create_test_importer(
    db_path: &str,
    policy: DuplicatePolicy,
) -> ItemImporterImpl<ItemImportRepositoryImpl, ConfigSnapshot> {
    let import_repo = ItemImportRepositoryImpl::new(db_path).expect("Failed to create ItemImportRepository");
    let config = ConfigSnapshot {
        duplicate_policy: policy,
        ..ConfigSnapshot::default()
    };
    ItemImporterImpl::with_default_stages(import_repo, config)
}

#[tokio::test]
async fn test_import_fixture_with_one_malformed_row() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path, DuplicatePolicy::Upsert);

    let result = importer.import_file(fixture("grocery_items.csv")).await.unwrap();

    assert_eq!(result.summary.total_rows, 6);
    assert_eq!(result.summary.inserted, 5);
    assert_eq!(result.summary.rejected, 1);

    let bad = &result.outcomes[5];
    assert_eq!(bad.row_number, 7);
    assert_eq!(bad.item_id, Some(106));
    assert_eq!(bad.status, RowStatus::Rejected);
    assert_eq!(bad.reasons[0].field, "price");

    let repo = item_repo(&db_path);
    assert_eq!(repo.count().unwrap(), 5);
    let towels = repo.find_by_id(105).unwrap().unwrap();
    assert_eq!(towels.price.to_string(), "1299.00");
    let yogurt = repo.find_by_id(104).unwrap().unwrap();
    assert_eq!(yogurt.x_for, 2);
    assert_eq!(yogurt.last_sold, Some(test_helpers::date(2024, 5, 31)));
}

#[tokio::test]
async fn test_reimport_under_upsert_updates_in_place() {
    let (tmp_db, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let importer = create_test_importer(&db_path, DuplicatePolicy::Upsert);

    let first = write_csv(
        dir.path(),
        "first.csv",
        "id,description,shelf_life,department,price,unit,x_for,cost\n\
         1,Apples,2w,Produce,1.00,lb,1,0.50\n",
    );
    let second = write_csv(
        dir.path(),
        "second.csv",
        "id,description,shelf_life,department,price,unit,x_for,cost\n\
         1,Apples,2w,Produce,1.10,lb,1,0.50\n",
    );

    importer.import_file(&first).await.unwrap();
    let result = importer.import_file(&second).await.unwrap();

    assert_eq!(result.summary.updated, 1);
    assert_eq!(result.outcomes[0].status, RowStatus::Updated);

    let repo = item_repo(&db_path);
    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(repo.find_by_id(1).unwrap().unwrap().price.to_string(), "1.10");
    drop(tmp_db);
}

#[tokio::test]
async fn test_reimport_without_stock_columns_keeps_stock() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let importer = create_test_importer(&db_path, DuplicatePolicy::Upsert);

    let full = write_csv(
        dir.path(),
        "full.csv",
        "id,description,shelf_life,price,unit,x_for,cost,quantity,reorder_point,date_added\n\
         1,Rice,2y,1.99,lb,1,0.90,50,5,2024-01-01\n",
    );
    let prices = write_csv(
        dir.path(),
        "prices.csv",
        "id,description,shelf_life,price,unit,x_for,cost\n\
         1,Rice,2y,2.49,lb,1,0.90\n",
    );

    importer.import_file(&full).await.unwrap();
    let result = importer.import_file(&prices).await.unwrap();
    assert_eq!(result.summary.updated, 1);

    let rice = item_repo(&db_path).find_by_id(1).unwrap().unwrap();
    assert_eq!(rice.price.to_string(), "2.49");
    assert_eq!(rice.quantity, 50);
    assert_eq!(rice.reorder_point, 5);
    assert_eq!(rice.date_added, test_helpers::date(2024, 1, 1));
}

#[tokio::test]
async fn test_reimport_under_reject_records_rejection() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "items.csv",
        "id,description,shelf_life,price,unit,x_for,cost\n\
         9,Rice,2y,1.99,lb,1,0.90\n",
    );

    create_test_importer(&db_path, DuplicatePolicy::Upsert)
        .import_file(&path)
        .await
        .unwrap();
    let result = create_test_importer(&db_path, DuplicatePolicy::Reject)
        .import_file(&path)
        .await
        .unwrap();

    assert_eq!(result.summary.rejected, 1);
    assert_eq!(result.outcomes[0].reasons[0].field, "id");

    let repo = ItemImportRepositoryImpl::new(&db_path).unwrap();
    let batches = repo.list_batches(10).await.unwrap();
    assert_eq!(batches.len(), 2);
    let rejections = repo.get_rejections(&result.batch.batch_id).await.unwrap();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].row_number, 2);
    assert_eq!(rejections[0].item_id, Some(9));
}

#[tokio::test]
async fn test_file_level_errors() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let importer = create_test_importer(&db_path, DuplicatePolicy::Upsert);

    let missing = dir.path().join("nope.csv");
    assert!(matches!(
        importer.import_file(&missing).await,
        Err(ImportError::FileNotFound(_))
    ));

    let txt = write_csv(dir.path(), "items.txt", "id\n1\n");
    assert!(matches!(
        importer.import_file(&txt).await,
        Err(ImportError::UnsupportedFormat(_))
    ));

    let no_price = write_csv(dir.path(), "short.csv", "id,description\n1,Apples\n");
    match importer.import_file(&no_price).await {
        Err(ImportError::MissingColumns(columns)) => assert!(columns.contains(&"price".to_string())),
        other => panic!("unexpected result: {:?}", other.map(|r| r.summary)),
    }

    assert_eq!(item_repo(&db_path).count().unwrap(), 0);
}

#[tokio::test]
async fn test_batch_import_files_are_independent() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let importer = create_test_importer(&db_path, DuplicatePolicy::Upsert);

    let good = write_csv(
        dir.path(),
        "good.csv",
        "id,description,shelf_life,price,unit,x_for,cost\n\
         1,Tea,1y,4.50,ea,1,2.00\n",
    );
    let missing = dir.path().join("missing.csv");

    let results = importer.batch_import(vec![good, missing]).await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(item_repo(&db_path).count().unwrap(), 1);
}
