// ==========================================
// 杂货库存管理系统 - 运行环境配置
// ==========================================
// 职责: 从环境变量解析运行环境与数据库路径
// 环境变量:
// - BACKSTOCK_ENV: development / testing / production（默认 development）
// - BACKSTOCK_DB_PATH: 显式指定数据库文件
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_VAR_ENVIRONMENT: &str = "BACKSTOCK_ENV";
pub const ENV_VAR_DB_PATH: &str = "BACKSTOCK_DB_PATH";

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Development,
    Testing,
    Production,
}

impl AppEnvironment {
    /// 从 BACKSTOCK_ENV 读取，未设置或无法识别时回退为 Development
    pub fn from_env() -> Self {
        match std::env::var(ENV_VAR_ENVIRONMENT) {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(value = %raw, error = %e, "无法识别的运行环境，使用 development");
                AppEnvironment::Development
            }),
            Err(_) => AppEnvironment::Development,
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, AppEnvironment::Development | AppEnvironment::Testing)
    }

    /// 生产环境使用 JSON 日志
    pub fn use_json_logs(&self) -> bool {
        matches!(self, AppEnvironment::Production)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnvironment::Development => write!(f, "development"),
            AppEnvironment::Testing => write!(f, "testing"),
            AppEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnvironment::Development),
            "testing" | "test" => Ok(AppEnvironment::Testing),
            "production" | "prod" => Ok(AppEnvironment::Production),
            other => Err(format!("未知的运行环境: {}", other)),
        }
    }
}

/// 获取默认数据库路径
///
/// 优先级：
/// 1. BACKSTOCK_DB_PATH
/// 2. 用户本地数据目录 / backstock / backstock.db
/// 3. 当前目录 ./backstock.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_VAR_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./backstock.db");

    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("backstock");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("backstock.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment() {
        assert_eq!("prod".parse::<AppEnvironment>().unwrap(), AppEnvironment::Production);
        assert_eq!("Testing".parse::<AppEnvironment>().unwrap(), AppEnvironment::Testing);
        assert!("staging-x".parse::<AppEnvironment>().is_err());
    }

    #[test]
    fn test_environment_flags() {
        assert!(AppEnvironment::Development.is_debug());
        assert!(!AppEnvironment::Production.is_debug());
        assert!(AppEnvironment::Production.use_json_logs());
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }
}
