// ==========================================
// 杂货库存管理系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、恢复默认
// 存储: config_kv（scope = global）
// ==========================================

use crate::api::error::ApiResult;
use crate::app::RequestContext;
use crate::config::ConfigManager;
use crate::presentation::ConfigView;
use tracing::{info, instrument};

/// 配置管理API
pub struct ConfigApi {
    config_manager: ConfigManager,
}

impl ConfigApi {
    pub fn new(ctx: &RequestContext) -> Self {
        Self {
            config_manager: ctx.config_manager(),
        }
    }

    /// 查询所有已知键的生效值
    pub fn list_configs(&self) -> ApiResult<ConfigView> {
        Ok(ConfigView {
            settings: self.config_manager.effective_values()?,
        })
    }

    /// 更新配置
    ///
    /// # 错误
    /// - Validation: 未知键或值不合法
    #[instrument(skip(self))]
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<ConfigView> {
        self.config_manager.set_config_value(key, value)?;
        self.list_configs()
    }

    /// 删除覆写值，恢复默认
    #[instrument(skip(self))]
    pub fn reset_config(&self, key: &str) -> ApiResult<ConfigView> {
        let removed = self.config_manager.reset_config_value(key)?;
        info!(config_key = key, removed = removed, "配置已恢复默认");
        self.list_configs()
    }
}
