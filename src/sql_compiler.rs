//! SQL compiler that renders a translated [`Filter`] and a page request into
//! PostgreSQL queries using sea-query.

use sea_query::{
    Asterisk, Expr, Iden, LikeExpr, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr, Value,
};

use crate::ast::CompOp;
use crate::filter::{Filter, Operand, TypedValue};
use crate::page::PageRequest;

/// Configuration for SQL optimization
#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    /// Minimum number of same-column equality ORs before converting to an IN clause
    pub max_or_conditions_for_in: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            max_or_conditions_for_in: 5,
        }
    }
}

/// Table identifier wrapper
#[derive(Debug, Clone)]
pub struct TableName(pub String);

impl Iden for TableName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Column identifier wrapper
#[derive(Debug, Clone)]
pub struct ColumnName(pub String);

impl Iden for ColumnName {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Represents an optimization applied during compilation
#[derive(Debug, Clone, PartialEq)]
pub enum Optimization {
    OrToIn { column: String, value_count: usize },
}

/// The page query and the matching count query for one list request
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub select: String,
    pub count: String,
    pub optimizations: Vec<Optimization>,
}

/// SQL Compiler bound to a single table
pub struct SqlCompiler {
    table: String,
    config: OptimizationConfig,
}

impl SqlCompiler {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_config(table, OptimizationConfig::default())
    }

    pub fn with_config(table: impl Into<String>, config: OptimizationConfig) -> Self {
        Self {
            table: table.into(),
            config,
        }
    }

    /// Compile the page query (`LIMIT size OFFSET number*size`) and the count query
    pub fn compile(&self, filter: &Filter, page: PageRequest) -> CompiledQuery {
        let mut optimizations = Vec::new();

        let mut select = self.filtered(filter, &mut optimizations);
        select.column(Asterisk).limit(page.size).offset(page.offset());

        let mut count = self.filtered(filter, &mut Vec::new());
        count.expr(Expr::cust("COUNT(*)"));

        let compiled = CompiledQuery {
            select: select.to_string(PostgresQueryBuilder),
            count: count.to_string(PostgresQueryBuilder),
            optimizations,
        };
        log::debug!("compiled select for {}: {}", self.table, compiled.select);
        compiled
    }

    /// `SELECT ... FROM table [WHERE ...]` without a projection
    fn filtered(&self, filter: &Filter, optimizations: &mut Vec<Optimization>) -> SelectStatement {
        let mut select = Query::select();
        select.from(TableName(self.table.clone()));
        if !filter.is_true() {
            select.and_where(self.compile_condition(filter, optimizations));
        }
        select
    }

    /// Compile a filter into a WHERE expression
    pub fn condition(&self, filter: &Filter) -> (SimpleExpr, Vec<Optimization>) {
        let mut optimizations = Vec::new();
        let expr = self.compile_condition(filter, &mut optimizations);
        (expr, optimizations)
    }

    fn compile_condition(&self, filter: &Filter, optimizations: &mut Vec<Optimization>) -> SimpleExpr {
        match filter {
            Filter::True => Expr::val(true).into(),
            Filter::Compare { column, op, operand } => compile_comparison(column, *op, operand),
            Filter::And(left, right) => {
                let left = self.compile_condition(left, optimizations);
                let right = self.compile_condition(right, optimizations);
                left.and(right)
            }
            Filter::Or(left, right) => {
                if let Some((in_expr, opt)) = self.try_optimize_or_to_in(filter) {
                    optimizations.push(opt);
                    return in_expr;
                }
                let left = self.compile_condition(left, optimizations);
                let right = self.compile_condition(right, optimizations);
                left.or(right)
            }
        }
    }

    /// Collapse `c == a or c == b or ...` on a single column into `c IN (a, b, ...)`
    fn try_optimize_or_to_in(&self, filter: &Filter) -> Option<(SimpleExpr, Optimization)> {
        let mut column = None;
        let mut values = Vec::new();
        if !collect_equality_values(filter, &mut column, &mut values) {
            return None;
        }
        let column = column?;
        if values.len() < self.config.max_or_conditions_for_in {
            return None;
        }

        let in_values: Vec<Value> = values.iter().map(|v| to_value(v)).collect();
        let expr = Expr::col(ColumnName(column.to_string())).is_in(in_values);
        Some((
            expr,
            Optimization::OrToIn {
                column: column.to_string(),
                value_count: values.len(),
            },
        ))
    }
}

/// Recursively collect equality values from an OR chain; false if the chain
/// mixes columns or contains anything other than scalar equality
fn collect_equality_values<'a>(
    filter: &'a Filter,
    column: &mut Option<&'a str>,
    values: &mut Vec<&'a TypedValue>,
) -> bool {
    match filter {
        Filter::Compare {
            column: c,
            op: CompOp::Eq,
            operand: Operand::Scalar(value),
        } => {
            if *column.get_or_insert(c.as_str()) != c.as_str() {
                return false;
            }
            values.push(value);
            true
        }
        Filter::Or(left, right) => {
            collect_equality_values(left, column, values) && collect_equality_values(right, column, values)
        }
        _ => false,
    }
}

fn compile_comparison(column: &str, op: CompOp, operand: &Operand) -> SimpleExpr {
    let values: Vec<&TypedValue> = match operand {
        Operand::Scalar(value) => vec![value],
        Operand::List(items) => items.iter().collect(),
    };

    match op {
        CompOp::In => col(column).is_in(values.into_iter().map(to_value)),
        CompOp::NotIn => col(column).is_not_in(values.into_iter().map(to_value)),
        // A list under a scalar operator matches if any element does
        _ => values
            .into_iter()
            .map(|value| compile_scalar(column, op, value))
            .reduce(|acc, expr| acc.or(expr))
            .unwrap_or_else(|| Expr::val(false).into()),
    }
}

fn compile_scalar(column: &str, op: CompOp, value: &TypedValue) -> SimpleExpr {
    let val = to_value(value);
    match op {
        CompOp::Eq | CompOp::In => col(column).eq(val),
        CompOp::Ne | CompOp::NotIn => col(column).ne(val),
        CompOp::Gt => col(column).gt(val),
        CompOp::Ge => col(column).gte(val),
        CompOp::Lt => col(column).lt(val),
        CompOp::Le => col(column).lte(val),
        CompOp::Like => col(column).like(LikeExpr::new(like_pattern(value)).escape(LIKE_ESCAPE)),
    }
}

fn col(column: &str) -> Expr {
    Expr::col(ColumnName(column.to_string()))
}

const LIKE_ESCAPE: char = '\\';

/// `*` is the query-language wildcard and becomes `%`; SQL's own `%`, `_`
/// and the escape character match literally
fn like_pattern(value: &TypedValue) -> String {
    match value {
        TypedValue::Text(s) => {
            let mut pattern = String::with_capacity(s.len());
            for c in s.chars() {
                match c {
                    '*' => pattern.push('%'),
                    '%' | '_' | LIKE_ESCAPE => {
                        pattern.push(LIKE_ESCAPE);
                        pattern.push(c);
                    }
                    _ => pattern.push(c),
                }
            }
            pattern
        }
        TypedValue::Integer(i) => i.to_string(),
        TypedValue::Decimal(d) => d.to_string(),
        TypedValue::Bool(b) => b.to_string(),
        TypedValue::Date(d) => d.to_string(),
    }
}

/// Convert a typed literal to a sea-query Value
fn to_value(value: &TypedValue) -> Value {
    match value {
        TypedValue::Text(s) => Value::from(s.clone()),
        TypedValue::Integer(i) => Value::from(*i),
        TypedValue::Decimal(d) => Value::from(*d),
        TypedValue::Bool(b) => Value::from(*b),
        TypedValue::Date(d) => Value::from(*d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn eq(column: &str, value: TypedValue) -> Filter {
        Filter::Compare {
            column: column.to_string(),
            op: CompOp::Eq,
            operand: Operand::Scalar(value),
        }
    }

    fn text(s: &str) -> TypedValue {
        TypedValue::Text(s.to_string())
    }

    #[test]
    fn test_true_has_no_where_clause() {
        let compiler = SqlCompiler::new("profiles");
        let result = compiler.compile(&Filter::True, PageRequest::new(2, 20));
        assert!(result.select.contains(r#"FROM "profiles""#));
        assert!(!result.select.contains("WHERE"));
        assert!(result.select.contains("LIMIT 20"));
        assert!(result.select.contains("OFFSET 40"));
        assert!(result.count.contains("COUNT(*)"));
        assert!(!result.count.contains("LIMIT"));
    }

    #[test]
    fn test_simple_filter_compilation() {
        let compiler = SqlCompiler::new("profiles");
        let filter = Filter::Compare {
            column: "age".to_string(),
            op: CompOp::Ge,
            operand: Operand::Scalar(TypedValue::Integer(21)),
        };
        let result = compiler.compile(&filter, PageRequest::new(0, 20));
        assert!(result.select.contains(r#""age" >= 21"#));
        assert!(result.count.contains(r#""age" >= 21"#));
        assert!(result.optimizations.is_empty());
    }

    #[test]
    fn test_like_and_lists() {
        let compiler = SqlCompiler::new("profiles");
        let filter = Filter::And(
            Box::new(Filter::Compare {
                column: "mail".to_string(),
                op: CompOp::Like,
                operand: Operand::Scalar(text("*@gso.org")),
            }),
            Box::new(Filter::Compare {
                column: "city".to_string(),
                op: CompOp::NotIn,
                operand: Operand::List(vec![text("Paris"), text("Lyon")]),
            }),
        );
        let result = compiler.compile(&filter, PageRequest::new(0, 10));
        assert!(result.select.contains(r#""mail" LIKE '%@gso.org' ESCAPE"#));
        assert!(result.select.contains(r#""city" NOT IN ('Paris', 'Lyon')"#));
        assert!(result.select.contains(" AND "));
    }

    #[test]
    fn test_like_escapes_sql_wildcards() {
        assert_eq!(like_pattern(&text("100%_*")), "100\\%\\_%");
        assert_eq!(like_pattern(&text(r"a\b*")), r"a\\b%");

        let compiler = SqlCompiler::new("profiles");
        let filter = Filter::Compare {
            column: "mail".to_string(),
            op: CompOp::Like,
            operand: Operand::Scalar(text("100%")),
        };
        let result = compiler.compile(&filter, PageRequest::new(0, 10));
        assert!(result.select.contains(r#""mail" LIKE "#));
        assert!(result.select.contains(" ESCAPE "));
        assert!(!result.select.contains("'100%'"));
    }

    #[test]
    fn test_date_value() {
        let compiler = SqlCompiler::new("profiles");
        let date = NaiveDate::from_ymd_opt(2000, 1, 31).unwrap();
        let filter = Filter::Compare {
            column: "birth_date".to_string(),
            op: CompOp::Lt,
            operand: Operand::Scalar(TypedValue::Date(date)),
        };
        let result = compiler.compile(&filter, PageRequest::new(0, 10));
        assert!(result.select.contains("birth_date"));
        assert!(result.select.contains("2000-01-31"));
    }

    #[test]
    fn test_or_to_in_optimization() {
        let config = OptimizationConfig {
            max_or_conditions_for_in: 2, // Lower threshold for testing
        };
        let compiler = SqlCompiler::with_config("profiles", config);

        let filter = Filter::Or(
            Box::new(Filter::Or(
                Box::new(eq("status", text("Open"))),
                Box::new(eq("status", text("Pending"))),
            )),
            Box::new(eq("status", text("Review"))),
        );
        let (_, optimizations) = compiler.condition(&filter);
        assert_eq!(
            optimizations,
            vec![Optimization::OrToIn {
                column: "status".to_string(),
                value_count: 3,
            }]
        );
        let result = compiler.compile(&filter, PageRequest::new(0, 10));
        assert!(result.select.contains(r#""status" IN ('Open', 'Pending', 'Review')"#));
    }

    #[test]
    fn test_or_on_different_columns_is_not_optimized() {
        let config = OptimizationConfig {
            max_or_conditions_for_in: 2,
        };
        let compiler = SqlCompiler::with_config("profiles", config);
        let filter = Filter::Or(
            Box::new(eq("status", text("Open"))),
            Box::new(eq("owner", text("Ada"))),
        );
        let result = compiler.compile(&filter, PageRequest::new(0, 10));
        assert!(result.optimizations.is_empty());
        assert!(result.select.contains(" OR "));
    }
}
