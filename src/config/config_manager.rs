// ==========================================
// 杂货库存管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::import::DuplicatePolicy;
use crate::domain::item::DEFAULT_REORDER_POINT;
use crate::i18n;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// 全局作用域
const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigError - 配置层错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("未知的配置键: {0}")]
    UnknownKey(String),

    #[error("配置值非法 {key}={value}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const IMPORT_DUPLICATE_POLICY: &str = "import.duplicate_policy";
    pub const IMPORT_MAX_UPLOAD_BYTES: &str = "import.max_upload_bytes";

    // 商品
    pub const ITEM_DEFAULT_REORDER_POINT: &str = "item.default_reorder_point";

    // 报表
    pub const REPORT_TOP_N: &str = "report.top_n";
    pub const REPORT_RECENT_SALES_DAYS: &str = "report.recent_sales_days";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";

    /// 全部已知配置键
    pub const ALL: [&str; 6] = [
        IMPORT_DUPLICATE_POLICY,
        IMPORT_MAX_UPLOAD_BYTES,
        ITEM_DEFAULT_REORDER_POINT,
        REPORT_TOP_N,
        REPORT_RECENT_SALES_DAYS,
        UI_LOCALE,
    ];
}

/// 默认上传上限: 16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const DEFAULT_REPORT_TOP_N: usize = 10;
pub const DEFAULT_RECENT_SALES_DAYS: i64 = 30;

fn default_value(key: &str) -> Option<String> {
    let value = match key {
        config_keys::IMPORT_DUPLICATE_POLICY => DuplicatePolicy::default().to_string(),
        config_keys::IMPORT_MAX_UPLOAD_BYTES => DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        config_keys::ITEM_DEFAULT_REORDER_POINT => DEFAULT_REORDER_POINT.to_string(),
        config_keys::REPORT_TOP_N => DEFAULT_REPORT_TOP_N.to_string(),
        config_keys::REPORT_RECENT_SALES_DAYS => DEFAULT_RECENT_SALES_DAYS.to_string(),
        config_keys::UI_LOCALE => i18n::DEFAULT_LOCALE.to_string(),
        _ => return None,
    };
    Some(value)
}

/// 校验配置值（写入前）
fn validate_value(key: &str, value: &str) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    };

    match key {
        config_keys::IMPORT_DUPLICATE_POLICY => {
            value.parse::<DuplicatePolicy>().map_err(invalid)?;
        }
        config_keys::IMPORT_MAX_UPLOAD_BYTES => {
            let n = value.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
            if n == 0 {
                return Err(invalid("必须大于 0".to_string()));
            }
        }
        config_keys::ITEM_DEFAULT_REORDER_POINT => {
            let n = value.trim().parse::<i32>().map_err(|e| invalid(e.to_string()))?;
            if n < 0 {
                return Err(invalid("不能为负数".to_string()));
            }
        }
        config_keys::REPORT_TOP_N | config_keys::REPORT_RECENT_SALES_DAYS => {
            let n = value.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
            if n == 0 {
                return Err(invalid("必须大于 0".to_string()));
            }
        }
        config_keys::UI_LOCALE => {
            if !i18n::is_supported(value.trim()) {
                return Err(invalid(format!(
                    "支持的语言: {}",
                    i18n::SUPPORTED_LOCALES.join(", ")
                )));
            }
        }
        other => return Err(ConfigError::UnknownKey(other.to_string())),
    }
    Ok(())
}

// ==========================================
// ConfigSnapshot - 请求级配置快照
// ==========================================
// 请求开始时读取一次，请求内不再访问 config_kv
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub duplicate_policy: DuplicatePolicy,
    pub max_upload_bytes: u64,
    pub default_reorder_point: i32,
    pub report_top_n: usize,
    pub recent_sales_days: i64,
    pub locale: String,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_reorder_point: DEFAULT_REORDER_POINT,
            report_top_n: DEFAULT_REPORT_TOP_N,
            recent_sales_days: DEFAULT_RECENT_SALES_DAYS,
            locale: i18n::DEFAULT_LOCALE.to_string(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 解析配置值，格式错误时告警并回退默认值
    fn parse_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + ToString,
    {
        let default_text = default.to_string();
        let raw = self.get_config_or_default(key, &default_text)?;
        Ok(raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = key,
                raw_value = %raw,
                "配置格式错误，使用默认值"
            );
            default
        }))
    }

    /// 写入配置（仅允许已知键，写入前校验）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_value(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value.trim()],
        )?;

        tracing::info!(config_key = key, value = %value.trim(), "配置已更新");
        Ok(())
    }

    /// 删除覆写值，恢复默认
    pub fn reset_config_value(&self, key: &str) -> ConfigResult<bool> {
        if default_value(key).is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
        )?;
        Ok(affected > 0)
    }

    // ===== 类型化读取 =====

    pub fn duplicate_policy(&self) -> ConfigResult<DuplicatePolicy> {
        self.parse_or_default(config_keys::IMPORT_DUPLICATE_POLICY, DuplicatePolicy::default())
    }

    pub fn max_upload_bytes(&self) -> ConfigResult<u64> {
        self.parse_or_default(config_keys::IMPORT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn default_reorder_point(&self) -> ConfigResult<i32> {
        self.parse_or_default(config_keys::ITEM_DEFAULT_REORDER_POINT, DEFAULT_REORDER_POINT)
    }

    pub fn report_top_n(&self) -> ConfigResult<usize> {
        self.parse_or_default(config_keys::REPORT_TOP_N, DEFAULT_REPORT_TOP_N)
    }

    pub fn recent_sales_days(&self) -> ConfigResult<i64> {
        self.parse_or_default(config_keys::REPORT_RECENT_SALES_DAYS, DEFAULT_RECENT_SALES_DAYS)
    }

    pub fn locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::UI_LOCALE, i18n::DEFAULT_LOCALE)?;
        if i18n::is_supported(value.trim()) {
            Ok(value.trim().to_string())
        } else {
            Ok(i18n::DEFAULT_LOCALE.to_string())
        }
    }

    /// 读取全部生效配置
    pub fn config_snapshot(&self) -> ConfigResult<ConfigSnapshot> {
        Ok(ConfigSnapshot {
            duplicate_policy: self.duplicate_policy()?,
            max_upload_bytes: self.max_upload_bytes()?,
            default_reorder_point: self.default_reorder_point()?,
            report_top_n: self.report_top_n()?,
            recent_sales_days: self.recent_sales_days()?,
            locale: self.locale()?,
        })
    }

    /// 所有已知键的生效值（未覆写的键取默认值）
    pub fn effective_values(&self) -> ConfigResult<BTreeMap<String, String>> {
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for key in config_keys::ALL {
            let default = default_value(key).unwrap_or_default();
            config_map.insert(key.to_string(), self.get_config_or_default(key, &default)?);
        }
        Ok(config_map)
    }

    /// 获取所有已知键的生效值（JSON 格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.effective_values()?)?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_duplicate_policy(&self) -> ConfigResult<DuplicatePolicy> {
        self.duplicate_policy()
    }

    async fn get_max_upload_bytes(&self) -> ConfigResult<u64> {
        self.max_upload_bytes()
    }

    async fn get_default_reorder_point(&self) -> ConfigResult<i32> {
        self.default_reorder_point()
    }
}

#[async_trait]
impl ImportConfigReader for ConfigSnapshot {
    async fn get_duplicate_policy(&self) -> ConfigResult<DuplicatePolicy> {
        Ok(self.duplicate_policy)
    }

    async fn get_max_upload_bytes(&self) -> ConfigResult<u64> {
        Ok(self.max_upload_bytes)
    }

    async fn get_default_reorder_point(&self) -> ConfigResult<i32> {
        Ok(self.default_reorder_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = manager();
        assert_eq!(config.config_snapshot().unwrap(), ConfigSnapshot::default());
    }

    #[test]
    fn test_set_and_read_override() {
        let config = manager();
        config
            .set_config_value(config_keys::IMPORT_DUPLICATE_POLICY, "reject")
            .unwrap();
        config.set_config_value(config_keys::REPORT_TOP_N, "5").unwrap();

        let snapshot = config.config_snapshot().unwrap();
        assert_eq!(snapshot.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(snapshot.report_top_n, 5);

        assert!(config.reset_config_value(config_keys::REPORT_TOP_N).unwrap());
        assert_eq!(config.report_top_n().unwrap(), DEFAULT_REPORT_TOP_N);
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_value() {
        let config = manager();
        assert!(matches!(
            config.set_config_value("season_mode", "AUTO"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set_config_value(config_keys::REPORT_TOP_N, "zero"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_config_value(config_keys::UI_LOCALE, "fr"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_corrupt_stored_value_falls_back() {
        let config = manager();
        {
            let conn = config.get_conn().unwrap();
            conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, 'lots')",
                params![config_keys::IMPORT_MAX_UPLOAD_BYTES],
            )
            .unwrap();
        }
        assert_eq!(config.max_upload_bytes().unwrap(), DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_json_snapshot_lists_all_keys() {
        let config = manager();
        let json = config.get_config_snapshot().unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(map.len(), config_keys::ALL.len());
        assert_eq!(map[config_keys::IMPORT_DUPLICATE_POLICY], "upsert");
    }
}
