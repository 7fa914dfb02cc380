// ==========================================
// 杂货库存管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::ConfigResult;
use crate::domain::import::DuplicatePolicy;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（读 config_kv）、ConfigSnapshot（请求级快照）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取重复编号处理策略
    ///
    /// # 默认值
    /// - upsert
    async fn get_duplicate_policy(&self) -> ConfigResult<DuplicatePolicy>;

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 16777216 (16 MiB)
    async fn get_max_upload_bytes(&self) -> ConfigResult<u64>;

    /// 获取导入行未提供补货点时的默认值
    ///
    /// # 默认值
    /// - 10
    async fn get_default_reorder_point(&self) -> ConfigResult<i32>;
}
