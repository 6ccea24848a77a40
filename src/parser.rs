//! 过滤表达式的语法分析器
//!
//! ## 解析流程图
//!
//! ```text
//! parse()
//!   ├─ 空 token 序列 → Predicate::True
//!   └─ parse_or_expression()
//!        ├─ parse_and_expression()
//!        │    ├─ parse_term()
//!        │    │    ├─ "(" → 分组表达式 (递归调用 parse_or_expression)
//!        │    │    └─ parse_comparison()
//!        │    │         ├─ 字段名 (Identifier)
//!        │    │         ├─ 比较运算符
//!        │    │         └─ parse_value()
//!        │    │              ├─ =in= / =out= → "(" 字面值 ("," 字面值)* ")"
//!        │    │              └─ 其他 → 单个字面值
//!        │    │
//!        │    └─ 遇到 and 时，继续解析右侧 term
//!        │
//!        └─ 遇到 or 时，继续解析右侧 and 表达式
//! ```
//!
//! ## 语法优先级（从高到低）
//!
//! 1. **括号分组** `(expression)`
//! 2. **比较操作** `field==value`, `field=in=(a,b)`
//! 3. **and**
//! 4. **or**
//!
//! 同一优先级内左结合：`a==1 or b==2 or c==3` 解析为 `Or(Or(a, b), c)`。
//!
//! ## 解析示例
//!
//! ```text
//! status==active and age>=21
//! mail=like="*@gso.org" or (age<18 and city=in=(Paris,Lyon))
//! birthDate>2000-01-01
//! ```

use thiserror::Error;

use crate::ast::{CompOp, Literal, Predicate, Value};
use crate::token::{Token, TokenKind};

/// 语法错误：在 `position` 处期望 `expected`，实际遇到 `found`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {position}: expected {expected}, found {found}")]
pub struct ParseError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

const END_OF_INPUT: &str = "end of input";

/// 括号嵌套的最大深度
pub const MAX_NESTING_DEPTH: usize = 32;
/// 单个表达式中比较运算的最大数量，限制了谓词树的深度
pub const MAX_COMPARISONS: usize = 256;

pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
    depth: usize,
    comparisons: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            comparisons: 0,
        }
    }

    /// 返回当前 token，不推进位置
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.position)
    }

    /// 返回当前 token 并推进位置
    fn advance(&mut self) -> Option<&'t Token<'a>> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// 检查当前 token 是否匹配给定类型
    fn match_token(&self, kind: &TokenKind<'_>) -> bool {
        self.peek().is_some_and(|token| {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        })
    }

    /// 构造指向当前 token（或输入结尾）的错误
    fn error(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError {
                position: token.span.start,
                expected: expected.to_string(),
                found: token.kind.describe(),
            },
            None => ParseError {
                position: self.tokens.last().map_or(0, |t| t.span.end),
                expected: expected.to_string(),
                found: END_OF_INPUT.to_string(),
            },
        }
    }

    /// 期望特定类型的 token 并推进，否则返回错误
    fn expect(&mut self, kind: TokenKind<'_>, expected: &str) -> Result<&'t Token<'a>, ParseError> {
        if self.match_token(&kind) {
            self.advance().ok_or_else(|| self.error(expected))
        } else {
            Err(self.error(expected))
        }
    }

    /// 解析完整的 token 序列；空序列得到恒真谓词
    pub fn parse(&mut self) -> Result<Predicate, ParseError> {
        if self.tokens.is_empty() {
            return Ok(Predicate::True);
        }

        let predicate = self.parse_or_expression()?;

        if self.peek().is_some() {
            return Err(self.error("'and', 'or' or end of input"));
        }
        Ok(predicate)
    }

    /// 解析 or 表达式 (最低优先级)
    ///
    /// 语法: `and_expr (or and_expr)*`
    fn parse_or_expression(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_and_expression()?;

        while self.match_token(&TokenKind::Or) {
            self.advance(); // 消费 or
            let right = self.parse_and_expression()?;
            left = Predicate::or(left, right);
        }

        Ok(left)
    }

    /// 解析 and 表达式
    ///
    /// 语法: `term (and term)*`
    fn parse_and_expression(&mut self) -> Result<Predicate, ParseError> {
        let mut left = self.parse_term()?;

        while self.match_token(&TokenKind::And) {
            self.advance(); // 消费 and
            let right = self.parse_term()?;
            left = Predicate::and(left, right);
        }

        Ok(left)
    }

    /// 语法: `"(" expr ")" | comparison`
    fn parse_term(&mut self) -> Result<Predicate, ParseError> {
        if self.match_token(&TokenKind::LParen) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(self.error(&format!("nesting depth <= {}", MAX_NESTING_DEPTH)));
            }
            self.advance(); // 消费 (
            self.depth += 1;
            let expr = self.parse_or_expression()?;
            self.depth -= 1;
            self.expect(TokenKind::RParen, "')'")?;
            Ok(expr)
        } else {
            self.parse_comparison()
        }
    }

    /// 语法: `IDENT OP value`
    fn parse_comparison(&mut self) -> Result<Predicate, ParseError> {
        let field = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Identifier(name)) => name.to_string(),
            _ => return Err(self.error("field name or '('")),
        };
        if self.comparisons >= MAX_COMPARISONS {
            return Err(self.error(&format!("at most {} comparisons", MAX_COMPARISONS)));
        }
        self.comparisons += 1;
        self.advance();

        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Op(op)) => *op,
            _ => return Err(self.error("comparison operator")),
        };
        self.advance();

        let value = self.parse_value(op)?;
        Ok(Predicate::Comparison { field, op, value })
    }

    /// 列表运算符要求括号包围的值列表，其余运算符只接受单个字面值
    fn parse_value(&mut self, op: CompOp) -> Result<Value, ParseError> {
        if !op.takes_list() {
            if self.match_token(&TokenKind::LParen) {
                return Err(self.error(&format!("a single literal after '{}'", op)));
            }
            return self.parse_literal().map(Value::Single);
        }

        self.expect(TokenKind::LParen, &format!("'(' to open the value list of '{}'", op))?;
        let mut values = vec![self.parse_literal()?];
        while self.match_token(&TokenKind::Comma) {
            self.advance(); // 消费 ,
            values.push(self.parse_literal()?);
        }
        self.expect(TokenKind::RParen, "',' or ')'")?;

        Ok(Value::List(values))
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let literal = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::String(s)) => Literal::String(s.to_string()),
            Some(TokenKind::Number(n)) => Literal::Number(n.to_string()),
            Some(TokenKind::Bool(b)) => Literal::Bool(*b),
            Some(TokenKind::Date(d)) => Literal::Date(d.to_string()),
            // 不带引号的字符串
            Some(TokenKind::Identifier(s)) => Literal::String(s.to_string()),
            _ => return Err(self.error("literal value")),
        };
        self.advance();
        Ok(literal)
    }
}
