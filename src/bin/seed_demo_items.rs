// ==========================================
// 演示数据写入工具
// ==========================================
// 用法: seed_demo_items [db_path] [count]
// - db_path 缺省为 get_default_db_path()
// - count 缺省 200
// 已存在的编号跳过，可重复执行
// ==========================================

use anyhow::Context;
use backstock::config::get_default_db_path;
use backstock::db::{init_schema, open_sqlite_connection};
use backstock::demo::generate_items;
use backstock::logging;
use backstock::repository::ItemRepository;
use chrono::Local;
use std::sync::{Arc, Mutex};

const DEFAULT_ITEM_COUNT: usize = 200;
const FIRST_DEMO_ID: i64 = 10_001;

fn main() -> anyhow::Result<()> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let count = std::env::args()
        .nth(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_ITEM_COUNT);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建目录 {}", parent.display()))?;
        }
    }

    let conn = open_sqlite_connection(&db_path).with_context(|| format!("无法打开数据库 {}", db_path))?;
    init_schema(&conn).context("初始化 schema 失败")?;
    let repo = ItemRepository::from_connection(Arc::new(Mutex::new(conn)));

    let items = generate_items(&mut rand::thread_rng(), count, FIRST_DEMO_ID, Local::now().date_naive());

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for item in &items {
        if repo.exists(item.id)? {
            skipped += 1;
            continue;
        }
        repo.insert(item)?;
        inserted += 1;
    }

    tracing::info!(
        db_path = %db_path,
        inserted = inserted,
        skipped = skipped,
        total = repo.count()?,
        "演示数据写入完成"
    );
    Ok(())
}
