use std::fmt;

/// 过滤表达式的谓词树
///
/// 叶子节点只能是 `Comparison` 或 `True`
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// 恒真谓词, 空查询的解析结果
    True,
    /// 基础比较运算, 例如 `age>=21`
    Comparison {
        field: String,
        op: CompOp,
        value: Value,
    },
    /// 逻辑与运算 (and)
    And(Box<Predicate>, Box<Predicate>),
    /// 逻辑或运算 (or)
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn comparison(field: impl Into<String>, op: CompOp, value: Value) -> Self {
        Predicate::Comparison {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// 树中比较节点的数量
    pub fn comparison_count(&self) -> usize {
        match self {
            Predicate::True => 0,
            Predicate::Comparison { .. } => 1,
            Predicate::And(l, r) | Predicate::Or(l, r) => l.comparison_count() + r.comparison_count(),
        }
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    Eq,    // ==
    Ne,    // !=
    Gt,    // >  or =gt=
    Ge,    // >= or =ge=
    Lt,    // <  or =lt=
    Le,    // <= or =le=
    In,    // =in=
    NotIn, // =out=
    Like,  // =like=
}

impl CompOp {
    /// 是否要求括号包围的值列表
    pub fn takes_list(self) -> bool {
        matches!(self, CompOp::In | CompOp::NotIn)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompOp::Eq => "==",
            CompOp::Ne => "!=",
            CompOp::Gt => ">",
            CompOp::Ge => ">=",
            CompOp::Lt => "<",
            CompOp::Le => "<=",
            CompOp::In => "=in=",
            CompOp::NotIn => "=out=",
            CompOp::Like => "=like=",
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 比较运算的右侧: 单个字面量或值列表 (仅用于 `=in=` / `=out=`)
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Single(Literal),
    List(Vec<Literal>),
}

/// 字面量值
///
/// 数字保留原始文本, 由字段类型决定最终的数值类型
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(String),
    Bool(bool),
    Date(String), // 例如："2023-12-25"
}

impl Literal {
    pub fn string(s: impl Into<String>) -> Self {
        Literal::String(s.into())
    }

    pub fn number(n: impl ToString) -> Self {
        Literal::Number(n.to_string())
    }

    /// 字面量的文本形式, 类型转换基于此文本
    pub fn as_text(&self) -> &str {
        match self {
            Literal::String(s) | Literal::Number(s) | Literal::Date(s) => s,
            Literal::Bool(true) => "true",
            Literal::Bool(false) => "false",
        }
    }
}

// 规范化序列化: 所有逻辑节点都加括号, 重新解析后得到相同的树

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => Ok(()),
            Predicate::Comparison { field, op, value } => write!(f, "{}{}{}", field, op, value),
            Predicate::And(l, r) => write!(f, "({} and {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} or {})", l, r),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Single(lit) => write!(f, "{}", lit),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, lit) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", lit)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
            Literal::Number(n) => f.write_str(n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Date(d) => f.write_str(d),
        }
    }
}
