//! 过滤表达式的词法分析器

use std::borrow::Cow;

use thiserror::Error;

use crate::ast::CompOp;
use crate::token::{Span, Token, TokenKind};

/// 无法识别的字符序列
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at position {position}: {reason}")]
pub struct LexError {
    /// 出错位置（字节索引）
    pub position: usize,
    pub reason: String,
}

impl LexError {
    fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// 将整个输入切分为 token 序列, 遇到第一个错误即返回
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).collect()
}

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 连续消费 ASCII 数字，返回消费的个数
    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    fn token(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token {
            kind,
            span: Span::new(start, self.position),
        }
    }

    /// 读取数字或日期字面量
    /// 注意：第一个字符（数字或负号）已经被调用者消费
    fn read_number(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        let negative = self.input[start..].starts_with('-');
        let int_digits = self.eat_digits() + usize::from(!negative);

        // YYYY-MM-DD
        if !negative && int_digits == 4 && self.peek() == Some('-') {
            return self.read_date(start);
        }

        if self.peek() == Some('.') {
            self.bump();
            if self.eat_digits() == 0 {
                return Err(LexError::new(start, "malformed number: missing fraction digits"));
            }
        }

        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            return Err(LexError::new(
                start,
                format!("malformed number starting with '{}'", &self.input[start..self.position]),
            ));
        }

        Ok(self.token(TokenKind::Number(&self.input[start..self.position]), start))
    }

    /// 读取日期 `YYYY-MM-DD`，年份已被消费
    fn read_date(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        for _ in 0..2 {
            if self.bump() != Some('-') || self.eat_digits() != 2 {
                return Err(LexError::new(start, "malformed date, expected YYYY-MM-DD"));
            }
        }
        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.' || c == '-') {
            return Err(LexError::new(start, "malformed date, expected YYYY-MM-DD"));
        }
        Ok(self.token(TokenKind::Date(&self.input[start..self.position]), start))
    }

    /// 读取引号包围的字符串字面量, 支持 `\"`、`\'`、`\\` 转义
    /// 注意：开始的引号已经被调用者消费
    fn read_string(&mut self, start: usize, quote: char) -> Result<Token<'a>, LexError> {
        let input = self.input;
        let content_start = self.position;
        // 只有出现转义时才分配新字符串
        let mut unescaped: Option<String> = None;

        loop {
            let at = self.position;
            match self.bump() {
                None => return Err(LexError::new(start, "unterminated string literal")),
                Some(c) if c == quote => {
                    let content = match unescaped {
                        Some(s) => Cow::Owned(s),
                        None => Cow::Borrowed(&input[content_start..at]),
                    };
                    return Ok(self.token(TokenKind::String(content), start));
                }
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some(e @ ('"' | '\'' | '\\')) => e,
                        _ => return Err(LexError::new(at, "invalid escape sequence")),
                    };
                    unescaped
                        .get_or_insert_with(|| input[content_start..at].to_string())
                        .push(escaped);
                }
                Some(c) => {
                    if let Some(s) = unescaped.as_mut() {
                        s.push(c);
                    }
                }
            }
        }
    }

    /// 读取标识符或关键字
    /// 标识符可以包含字母、数字、点和下划线
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '.' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        self.token(match_keyword(literal), start)
    }

    /// 读取 `=name=` 形式的命名运算符，开头的 '=' 已被消费
    fn read_named_operator(&mut self, start: usize) -> Result<Token<'a>, LexError> {
        let input = self.input;
        let name_start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }
        let name = &input[name_start..self.position];
        if self.bump() != Some('=') {
            return Err(LexError::new(start, format!("operator '={}' is missing its closing '='", name)));
        }
        let op = match name.to_ascii_lowercase().as_str() {
            "gt" => CompOp::Gt,
            "ge" => CompOp::Ge,
            "lt" => CompOp::Lt,
            "le" => CompOp::Le,
            "in" => CompOp::In,
            "out" => CompOp::NotIn,
            "like" => CompOp::Like,
            _ => return Err(LexError::new(start, format!("unknown operator '={}='", name))),
        };
        Ok(self.token(TokenKind::Op(op), start))
    }

    fn next_token(&mut self) -> Option<Result<Token<'a>, LexError>> {
        self.skip_whitespace();
        let start = self.position;

        let c = self.bump()?; // 到达输入末尾

        let token = match c {
            '(' => self.token(TokenKind::LParen, start),
            ')' => self.token(TokenKind::RParen, start),
            ',' => self.token(TokenKind::Comma, start),
            '=' => match self.peek() {
                Some('=') => {
                    self.bump();
                    self.token(TokenKind::Op(CompOp::Eq), start)
                }
                Some(c) if c.is_ascii_alphabetic() => return Some(self.read_named_operator(start)),
                _ => return Some(Err(LexError::new(start, "expected '==' or a named operator like '=in='"))),
            },
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::Op(CompOp::Ne), start)
                } else {
                    return Some(Err(LexError::new(start, "expected '!='")));
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::Op(CompOp::Le), start)
                } else {
                    self.token(TokenKind::Op(CompOp::Lt), start)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(TokenKind::Op(CompOp::Ge), start)
                } else {
                    self.token(TokenKind::Op(CompOp::Gt), start)
                }
            }
            '"' | '\'' => return Some(self.read_string(start, c)),
            '-' if matches!(self.peek(), Some(d) if d.is_ascii_digit()) => {
                return Some(self.read_number(start))
            }
            c if c.is_ascii_digit() => return Some(self.read_number(start)),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(start),
            c => return Some(Err(LexError::new(start, format!("unexpected character '{}'", c)))),
        };
        Some(Ok(token))
    }
}

fn match_keyword(s: &str) -> TokenKind<'_> {
    match s {
        "true" => return TokenKind::Bool(true),
        "false" => return TokenKind::Bool(false),
        _ => {}
    }
    match s.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        _ => TokenKind::Identifier(s),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.next_token();
        if matches!(item, Some(Err(_))) {
            // 出错后不再产生 token
            self.position = self.input.len();
        }
        item
    }
}
