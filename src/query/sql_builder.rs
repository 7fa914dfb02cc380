// ==========================================
// 杂货库存管理系统 - SQL 构建工具模块
// ==========================================
// 职责: 拼装 SELECT 语句结构，用户输入只以绑定参数出现
// 红线: 条件片段只允许使用 `?` 占位符，禁止拼接值
// ==========================================

use rusqlite::types::Value;

/// 编译后的查询（SQL + 按顺序绑定的参数）
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// SQL 查询构建器（流式 API）
///
/// # 示例
/// ```
/// use backstock::query::sql_builder::SqlQueryBuilder;
///
/// let query = SqlQueryBuilder::new("SELECT * FROM grocery_items")
///     .where_param("department LIKE ? ESCAPE '\\'", "%dairy%".to_string())
///     .and_if(Some(("quantity = ?", 0i64.into())))
///     .order_by("id ASC")
///     .limit(10)
///     .compile();
///
/// assert!(query.sql.contains("WHERE department LIKE ?"));
/// assert!(query.sql.contains("AND quantity = ?"));
/// assert!(query.sql.ends_with("ORDER BY id ASC LIMIT 10"));
/// assert_eq!(query.params.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    select_clause: String,
    where_clauses: Vec<String>,
    params: Vec<Value>,
    order_by_clause: Option<String>,
    limit_clause: Option<usize>,
}

impl SqlQueryBuilder {
    /// 创建新的 SQL 查询构建器
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_clause: None,
            limit_clause: None,
        }
    }

    /// 添加无参数的 WHERE 条件
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// 添加带一个绑定参数的 WHERE 条件
    pub fn where_param(mut self, condition: &str, value: impl Into<Value>) -> Self {
        self.where_clauses.push(condition.to_string());
        self.params.push(value.into());
        self
    }

    /// 条件添加 AND 子句
    pub fn and_if(self, condition: Option<(&str, Value)>) -> Self {
        match condition {
            Some((cond, value)) => self.where_param(cond, value),
            None => self,
        }
    }

    /// 添加 ORDER BY 子句
    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by_clause = Some(order.to_string());
        self
    }

    /// 添加 LIMIT 子句
    pub fn limit(mut self, n: usize) -> Self {
        self.limit_clause = Some(n);
        self
    }

    /// 可选 LIMIT
    pub fn limit_opt(self, n: Option<usize>) -> Self {
        match n {
            Some(n) => self.limit(n),
            None => self,
        }
    }

    /// 构建最终的 SQL 语句
    pub fn build(&self) -> String {
        let mut sql = self.select_clause.clone();

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_by_clause {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        if let Some(n) = self.limit_clause {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        sql
    }

    /// 构建 SQL 并取出参数
    pub fn compile(self) -> CompiledQuery {
        let sql = self.build();
        CompiledQuery {
            sql,
            params: self.params,
        }
    }
}
