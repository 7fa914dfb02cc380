// ==========================================
// 杂货库存管理系统 - 商品仓储
// ==========================================
// 职责: 管理 grocery_items 表的 CRUD 与检索
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::OmittedFields;
use crate::domain::item::GroceryItem;
use crate::domain::types::{cents_to_money, money_to_cents, ShelfLife, UNCATEGORIZED};
use crate::query::{ItemFilter, SqlQueryBuilder};
use crate::repository::error::{OperationContext, RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// 商品查询列（顺序与 map_item_row 一致）
pub(crate) const ITEM_COLUMNS: &str = "id, description, last_sold, shelf_life, department, \
     price_cents, unit, x_for, cost_cents, quantity, reorder_point, date_added";

fn select_items_sql() -> String {
    format!("SELECT {} FROM grocery_items", ITEM_COLUMNS)
}

/// 行 → GroceryItem
pub(crate) fn map_item_row(row: &Row) -> rusqlite::Result<GroceryItem> {
    let shelf_life_raw: String = row.get(3)?;
    let shelf_life = shelf_life_raw
        .parse::<ShelfLife>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

    Ok(GroceryItem {
        id: row.get(0)?,
        description: row.get(1)?,
        last_sold: row.get(2)?,
        shelf_life,
        department: row.get(4)?,
        price: cents_to_money(row.get(5)?),
        unit: row.get(6)?,
        x_for: row.get(7)?,
        cost: cents_to_money(row.get(8)?),
        quantity: row.get(9)?,
        reorder_point: row.get(10)?,
        date_added: row.get(11)?,
    })
}

fn cents_of(field: &str, value: rust_decimal::Decimal) -> RepositoryResult<i64> {
    money_to_cents(value).ok_or_else(|| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("金额超出范围: {}", value),
    })
}

// ==========================================
// 连接级操作（供事务 / 保存点复用）
// ==========================================

pub(crate) fn item_exists(conn: &Connection, id: i64) -> RepositoryResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM grocery_items WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn insert_item(conn: &Connection, item: &GroceryItem) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO grocery_items (
            id, description, last_sold, shelf_life, department,
            price_cents, unit, x_for, cost_cents, quantity, reorder_point, date_added
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            item.id,
            item.description,
            item.last_sold,
            item.shelf_life.to_string(),
            item.department,
            cents_of("price", item.price)?,
            item.unit,
            item.x_for,
            cents_of("cost", item.cost)?,
            item.quantity,
            item.reorder_point,
            item.date_added,
        ],
    )?;
    Ok(())
}

/// 按 id 覆盖更新
///
/// # 返回
/// - Ok(true): 已更新
/// - Ok(false): 记录不存在
pub(crate) fn update_item(conn: &Connection, item: &GroceryItem) -> RepositoryResult<bool> {
    let affected = conn.execute(
        r#"
        UPDATE grocery_items SET
            description = ?2, last_sold = ?3, shelf_life = ?4, department = ?5,
            price_cents = ?6, unit = ?7, x_for = ?8, cost_cents = ?9,
            quantity = ?10, reorder_point = ?11, date_added = ?12,
            updated_at = datetime('now')
        WHERE id = ?1
        "#,
        params![
            item.id,
            item.description,
            item.last_sold,
            item.shelf_life.to_string(),
            item.department,
            cents_of("price", item.price)?,
            item.unit,
            item.x_for,
            cents_of("cost", item.cost)?,
            item.quantity,
            item.reorder_point,
            item.date_added,
        ],
    )?;
    Ok(affected > 0)
}

/// 导入覆盖更新：源数据未提供的可选字段保留库内值
///
/// # 返回
/// - Ok(true): 已更新
/// - Ok(false): 记录不存在
pub(crate) fn merge_item(
    conn: &Connection,
    item: &GroceryItem,
    omitted: &OmittedFields,
) -> RepositoryResult<bool> {
    let affected = conn.execute(
        r#"
        UPDATE grocery_items SET
            description = ?2, shelf_life = ?3, department = ?4,
            price_cents = ?5, unit = ?6, x_for = ?7, cost_cents = ?8,
            quantity = CASE WHEN ?9 THEN quantity ELSE ?10 END,
            reorder_point = CASE WHEN ?11 THEN reorder_point ELSE ?12 END,
            last_sold = CASE WHEN ?13 THEN last_sold ELSE ?14 END,
            date_added = CASE WHEN ?15 THEN date_added ELSE ?16 END,
            updated_at = datetime('now')
        WHERE id = ?1
        "#,
        params![
            item.id,
            item.description,
            item.shelf_life.to_string(),
            item.department,
            cents_of("price", item.price)?,
            item.unit,
            item.x_for,
            cents_of("cost", item.cost)?,
            omitted.quantity,
            item.quantity,
            omitted.reorder_point,
            item.reorder_point,
            omitted.last_sold,
            item.last_sold,
            omitted.date_added,
            item.date_added,
        ],
    )?;
    Ok(affected > 0)
}

// ==========================================
// ItemRepository - 商品仓储
// ==========================================
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    /// 创建新的 ItemRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增商品（编号已存在时返回 UniqueConstraintViolation）
    pub fn insert(&self, item: &GroceryItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_item(&conn, item).op("insert_item")
    }

    /// 按编号更新商品
    ///
    /// # 返回
    /// - Err(NotFound): 编号不存在
    pub fn update(&self, item: &GroceryItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if update_item(&conn, item).op("update_item")? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound {
                entity: "GroceryItem".to_string(),
                id: item.id.to_string(),
            }
            .in_op("update_item"))
        }
    }

    /// 按编号更新商品，未提供的可选字段保留库内值
    ///
    /// # 返回
    /// - Err(NotFound): 编号不存在
    pub fn merge(&self, item: &GroceryItem, omitted: &OmittedFields) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if merge_item(&conn, item, omitted).op("merge_item")? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound {
                entity: "GroceryItem".to_string(),
                id: item.id.to_string(),
            }
            .in_op("merge_item"))
        }
    }

    /// 删除商品
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn
            .execute("DELETE FROM grocery_items WHERE id = ?1", params![id])
            .op("delete_item")?;
        Ok(affected > 0)
    }

    /// 按编号查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<GroceryItem>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", select_items_sql());
        conn.query_row(&sql, params![id], map_item_row)
            .optional()
            .op("find_item")
    }

    pub fn exists(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        item_exists(&conn, id).op("item_exists")
    }

    /// 按检索条件查询（按编号升序）
    pub fn search(&self, filter: &ItemFilter, limit: Option<usize>) -> RepositoryResult<Vec<GroceryItem>> {
        let (condition, value) = filter.condition();
        let query = SqlQueryBuilder::new(&select_items_sql())
            .where_param(&condition, value)
            .order_by("id ASC")
            .limit_opt(limit)
            .compile();

        tracing::debug!(sql = %query.sql, criterion = %filter.criterion(), "执行商品检索");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&query.sql).op("search_items")?;
        let items = stmt
            .query_map(params_from_iter(query.params.iter()), map_item_row)
            .op("search_items")?
            .collect::<Result<Vec<_>, _>>()
            .op("search_items")?;
        Ok(items)
    }

    /// 全部商品（按编号升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<GroceryItem>> {
        self.list_by_department(None)
    }

    /// 按部门查询（大小写不敏感；"Uncategorized" 匹配未分配部门）
    pub fn list_by_department(&self, department: Option<&str>) -> RepositoryResult<Vec<GroceryItem>> {
        let mut builder = SqlQueryBuilder::new(&select_items_sql());
        if let Some(dept) = department.map(str::trim).filter(|d| !d.is_empty()) {
            builder = if dept.eq_ignore_ascii_case(UNCATEGORIZED) {
                builder.where_clause("(department IS NULL OR TRIM(department) = '')")
            } else {
                builder.where_param("LOWER(TRIM(department)) = LOWER(?)", dept.to_string())
            };
        }
        let query = builder.order_by("id ASC").compile();

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&query.sql).op("list_items")?;
        let items = stmt
            .query_map(params_from_iter(query.params.iter()), map_item_row)
            .op("list_items")?
            .collect::<Result<Vec<_>, _>>()
            .op("list_items")?;
        Ok(items)
    }

    /// 商品总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.query_row("SELECT COUNT(*) FROM grocery_items", [], |row| row.get(0))
            .op("count_items")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::types::parse_money;
    use chrono::NaiveDate;

    fn repo() -> ItemRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ItemRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn item(id: i64, description: &str, department: Option<&str>, price: &str) -> GroceryItem {
        GroceryItem {
            id,
            description: description.to_string(),
            department: department.map(str::to_string),
            unit: "ea".to_string(),
            shelf_life: "7d".parse().unwrap(),
            price: parse_money(price).unwrap(),
            cost: parse_money("0.50").unwrap(),
            x_for: 1,
            quantity: 3,
            reorder_point: 10,
            last_sold: NaiveDate::from_ymd_opt(2024, 3, 5),
            date_added: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_insert_and_find_round_trip() {
        let repo = repo();
        let apple = item(1, "Honeycrisp Apples", Some("Produce"), "3.49");
        repo.insert(&apple).unwrap();

        assert_eq!(repo.find_by_id(1).unwrap(), Some(apple));
        assert_eq!(repo.find_by_id(2).unwrap(), None);
    }

    #[test]
    fn test_duplicate_insert_is_unique_violation() {
        let repo = repo();
        repo.insert(&item(1, "Milk", None, "1.00")).unwrap();
        let err = repo.insert(&item(1, "Milk", None, "1.00")).unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(err.operation(), Some("insert_item"));
    }

    #[test]
    fn test_update_and_delete() {
        let repo = repo();
        let mut milk = item(1, "Milk", None, "1.00");
        repo.insert(&milk).unwrap();

        milk.quantity = 40;
        repo.update(&milk).unwrap();
        assert_eq!(repo.find_by_id(1).unwrap().unwrap().quantity, 40);

        assert!(repo.update(&item(9, "Ghost", None, "1.00")).unwrap_err().is_not_found());
        assert!(repo.delete(1).unwrap());
        assert!(!repo.delete(1).unwrap());
    }

    #[test]
    fn test_list_by_department() {
        let repo = repo();
        repo.insert(&item(1, "Milk", Some("Dairy"), "1.00")).unwrap();
        repo.insert(&item(2, "Apple", Some("Produce"), "1.00")).unwrap();
        repo.insert(&item(3, "Mystery", None, "1.00")).unwrap();

        assert_eq!(repo.list_all().unwrap().len(), 3);
        assert_eq!(repo.list_by_department(Some("dairy")).unwrap()[0].id, 1);
        assert_eq!(repo.list_by_department(Some("uncategorized")).unwrap()[0].id, 3);
        assert_eq!(repo.count().unwrap(), 3);
    }
}
