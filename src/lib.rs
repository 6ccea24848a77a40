//! Filter-query compiler and pagination helpers for list endpoints.
//!
//! ```text
//! query string ─ Lexer ─ Parser ─ Predicate ─ translate(FieldMapping) ─ Filter ─ SqlCompiler
//! page/size ─ PageGuard ─ PageRequest ─ storage ─ PageResult ─ PageLinks / PageEnvelope
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod links;
pub mod page;
pub mod parser;
pub mod sql_compiler;
pub mod token;
pub mod translator;

use ast::Predicate;
use error::QueryError;
use filter::Filter;
use lexer::tokenize;
use parser::Parser;
use translator::{translate, FieldMapping};

/// Lex and parse a filter expression. Blank input yields [`Predicate::True`].
pub fn parse_filter(query: &str) -> Result<Predicate, QueryError> {
    let tokens = tokenize(query)?;
    log::trace!("lexed {} tokens from {:?}", tokens.len(), query);
    let predicate = Parser::new(&tokens).parse()?;
    Ok(predicate)
}

/// Full pipeline for the `query` request parameter. An absent parameter
/// matches everything.
pub fn compile_filter(query: Option<&str>, mapping: &FieldMapping) -> Result<Filter, QueryError> {
    let predicate = match query {
        Some(q) => parse_filter(q)?,
        None => Predicate::True,
    };
    let filter = translate(&predicate, mapping)?;
    log::debug!(
        "compiled filter with {} comparisons: {}",
        predicate.comparison_count(),
        predicate
    );
    Ok(filter)
}
