// ==========================================
// 杂货库存管理系统 - 表现形式协商
// ==========================================
// 输入: "html" / "json" / MIME 类型 / Accept 风格列表
// 规则: 第一个可识别的类型生效，均不可识别时默认 HTML
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    #[default]
    Html,
    Json,
}

impl Representation {
    /// 按声明的偏好选择表现形式
    ///
    /// # 示例
    /// ```
    /// use backstock::presentation::Representation;
    /// assert_eq!(
    ///     Representation::negotiate(Some("application/json;q=0.9, text/html")),
    ///     Representation::Json
    /// );
    /// assert_eq!(Representation::negotiate(None), Representation::Html);
    /// ```
    pub fn negotiate(preference: Option<&str>) -> Self {
        preference
            .into_iter()
            .flat_map(|p| p.split(','))
            .filter_map(|entry| Self::recognise(entry.split(';').next().unwrap_or("")))
            .next()
            .unwrap_or_default()
    }

    fn recognise(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "html" | "text/html" | "application/xhtml+xml" => Some(Representation::Html),
            "json" | "application/json" | "text/json" => Some(Representation::Json),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Representation::Html => "text/html; charset=utf-8",
            Representation::Json => "application/json",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Html => write!(f, "html"),
            Representation::Json => write!(f, "json"),
        }
    }
}

impl FromStr for Representation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::recognise(s).ok_or_else(|| format!("未知的表现形式: {}（可选 html / json）", s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_first_recognised_wins() {
        assert_eq!(Representation::negotiate(Some("json")), Representation::Json);
        assert_eq!(
            Representation::negotiate(Some("image/png, text/html, application/json")),
            Representation::Html
        );
        assert_eq!(
            Representation::negotiate(Some("*/*; q=0.1, application/json")),
            Representation::Json
        );
    }

    #[test]
    fn test_negotiate_defaults_to_html() {
        assert_eq!(Representation::negotiate(Some("text/plain")), Representation::Html);
        assert_eq!(Representation::negotiate(Some("")), Representation::Html);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("JSON".parse::<Representation>().unwrap(), Representation::Json);
        assert!("xml".parse::<Representation>().is_err());
    }
}
