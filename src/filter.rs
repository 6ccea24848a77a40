//! Backend predicate: the storage-neutral output of field translation.
//!
//! Same shape as [`crate::ast::Predicate`], but every field is resolved to
//! its storage column and every literal is coerced to the column's type.

use chrono::NaiveDate;

use crate::ast::CompOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every record.
    True,
    Compare {
        column: String,
        op: CompOp,
        operand: Operand,
    },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    pub fn is_true(&self) -> bool {
        matches!(self, Filter::True)
    }

    /// Storage columns referenced by this filter, in depth-first order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::True => {}
            Filter::Compare { column, .. } => out.push(column),
            Filter::And(l, r) | Filter::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(TypedValue),
    List(Vec<TypedValue>),
}

/// A literal after coercion to its column type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
}
