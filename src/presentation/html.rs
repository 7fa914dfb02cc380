// ==========================================
// 杂货库存管理系统 - HTML 渲染
// ==========================================
// 职责: 遍历视图的 JSON 值生成 HTML 文档
// 规则:
// - 对象 → <dl>，对象数组 → <table>，标量数组 → <ul>
// - 所有文本经过转义
// - 字段标签经 i18n 本地化，缺少翻译时由字段名生成
// ==========================================

use crate::i18n;
use serde_json::{Map, Value};
use std::fmt::Write;

/// HTML 转义
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// 字段标签（"field.<key>" 无翻译时: 下划线转空格、首字母大写）
pub fn field_label(key: &str) -> String {
    let translation_key = format!("field.{}", key);
    let translated = i18n::t(&translation_key);
    if translated.is_empty() || translated.ends_with(&translation_key) {
        humanize(key)
    } else {
        translated
    }
}

fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => i18n::t("common.none"),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // 非标量由调用方处理
        other => other.to_string(),
    }
}

// ==========================================
// HtmlRenderer
// ==========================================
pub struct HtmlRenderer;

impl HtmlRenderer {
    /// 渲染完整文档
    pub fn document(&self, title: &str, body: &Value) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<h1>{}</h1>\n",
            escape(&i18n::current_locale()),
            escape(title),
            escape(title)
        );
        self.render_value(&mut out, body);
        out.push_str("\n</body>\n</html>\n");
        out
    }

    fn render_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Object(map) => self.render_object(out, map),
            Value::Array(items) => self.render_array(out, items),
            scalar => {
                let class = if scalar.is_null() { "null" } else { "value" };
                let _ = write!(out, "<span class=\"{}\">{}</span>", class, escape(&scalar_text(scalar)));
            }
        }
    }

    fn render_object(&self, out: &mut String, map: &Map<String, Value>) {
        out.push_str("<dl>\n");
        for (key, value) in map {
            let _ = write!(
                out,
                "<dt data-field=\"{}\">{}</dt>\n<dd>",
                escape(key),
                escape(&field_label(key))
            );
            self.render_value(out, value);
            out.push_str("</dd>\n");
        }
        out.push_str("</dl>\n");
    }

    fn render_array(&self, out: &mut String, items: &[Value]) {
        if items.is_empty() {
            let _ = write!(out, "<p class=\"empty\">{}</p>", escape(&i18n::t("common.empty")));
            return;
        }

        if items.iter().all(Value::is_object) {
            self.render_table(out, items);
            return;
        }

        out.push_str("<ul>\n");
        for item in items {
            out.push_str("<li>");
            self.render_value(out, item);
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }

    /// 对象数组渲染为表格，列为所有行键的并集（按首次出现顺序）
    fn render_table(&self, out: &mut String, rows: &[Value]) {
        let mut columns: Vec<&String> = Vec::new();
        for row in rows {
            if let Value::Object(map) = row {
                for key in map.keys() {
                    if !columns.contains(&key) {
                        columns.push(key);
                    }
                }
            }
        }

        out.push_str("<table>\n<thead><tr>");
        for column in &columns {
            let _ = write!(
                out,
                "<th data-field=\"{}\">{}</th>",
                escape(column),
                escape(&field_label(column))
            );
        }
        out.push_str("</tr></thead>\n<tbody>\n");

        for row in rows {
            out.push_str("<tr>");
            for column in &columns {
                out.push_str("<td>");
                match row.get(column.as_str()) {
                    Some(value) => self.render_value(out, value),
                    None => self.render_value(out, &Value::Null),
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
    }
}
