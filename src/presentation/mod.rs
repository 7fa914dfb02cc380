// ==========================================
// 杂货库存管理系统 - 表现层
// ==========================================
// 职责: 将视图渲染为 HTML 文档或 JSON 负载
// 红线: 两种表现形式来自同一视图结构，数据一致
// ==========================================

pub mod html;
pub mod representation;
pub mod views;

pub use html::HtmlRenderer;
pub use representation::Representation;
pub use views::{
    BatchListView, ConfigView, DiagnosticsView, ErrorView, HealthView, ItemView, ItemWriteView,
    RejectionListView, SearchView, View, WriteAction,
};

use crate::i18n;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

/// 按表现形式渲染视图
pub fn render<V: View>(view: &V, representation: Representation) -> Result<Rendered, PresentationError> {
    let body = match representation {
        Representation::Json => serde_json::to_string_pretty(view)?,
        Representation::Html => {
            let value = serde_json::to_value(view)?;
            HtmlRenderer.document(&i18n::t(view.title_key()), &value)
        }
    };

    Ok(Rendered {
        content_type: representation.content_type(),
        body,
    })
}
