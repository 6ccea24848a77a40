//! 字段转换器：将谓词树中的领域字段名解析为存储列名，并按列类型转换字面值

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::{CompOp, Literal, Predicate, Value};
use crate::filter::{Filter, Operand, TypedValue};

/// DATE 字段唯一接受的格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 存储列的值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Bool,
    Date,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Date => "date (YYYY-MM-DD)",
        })
    }
}

/// 单个领域字段的映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "column")]
    pub storage_name: String,
    #[serde(rename = "type")]
    pub value_type: FieldType,
}

/// 领域字段名 → 存储列名 + 值类型
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: HashMap<String, FieldSpec>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        mut self,
        domain_name: impl Into<String>,
        storage_name: impl Into<String>,
        value_type: FieldType,
    ) -> Self {
        self.fields.insert(
            domain_name.into(),
            FieldSpec {
                storage_name: storage_name.into(),
                value_type,
            },
        );
        self
    }

    pub fn get(&self, domain_name: &str) -> Option<&FieldSpec> {
        self.fields.get(domain_name)
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("value '{value}' is not valid for field '{field}': expected {expected_type}")]
    TypeCoercion {
        field: String,
        value: String,
        expected_type: FieldType,
    },
}

impl TranslateError {
    pub fn field(&self) -> &str {
        match self {
            TranslateError::UnknownField { field } | TranslateError::TypeCoercion { field, .. } => field,
        }
    }
}

/// 深度优先转换整棵树，遇到第一个错误立即返回
pub fn translate(predicate: &Predicate, mapping: &FieldMapping) -> Result<Filter, TranslateError> {
    match predicate {
        Predicate::True => Ok(Filter::True),
        Predicate::Comparison { field, op, value } => translate_comparison(field, *op, value, mapping),
        Predicate::And(left, right) => Ok(Filter::And(
            Box::new(translate(left, mapping)?),
            Box::new(translate(right, mapping)?),
        )),
        Predicate::Or(left, right) => Ok(Filter::Or(
            Box::new(translate(left, mapping)?),
            Box::new(translate(right, mapping)?),
        )),
    }
}

fn translate_comparison(
    field: &str,
    op: CompOp,
    value: &Value,
    mapping: &FieldMapping,
) -> Result<Filter, TranslateError> {
    let spec = mapping.get(field).ok_or_else(|| TranslateError::UnknownField {
        field: field.to_string(),
    })?;

    // =like= 只能用于字符串字段
    if op == CompOp::Like && spec.value_type != FieldType::String {
        return Err(TranslateError::TypeCoercion {
            field: field.to_string(),
            value: value.to_string(),
            expected_type: FieldType::String,
        });
    }

    let operand = match (op.takes_list(), value) {
        (false, Value::Single(lit)) => Operand::Scalar(coerce(field, spec.value_type, lit)?),
        (true, Value::Single(lit)) => Operand::List(vec![coerce(field, spec.value_type, lit)?]),
        (true, Value::List(items)) => Operand::List(
            items
                .iter()
                .map(|lit| coerce(field, spec.value_type, lit))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        (false, Value::List(_)) => {
            return Err(TranslateError::TypeCoercion {
                field: field.to_string(),
                value: value.to_string(),
                expected_type: spec.value_type,
            })
        }
    };

    Ok(Filter::Compare {
        column: spec.storage_name.clone(),
        op,
        operand,
    })
}

fn coerce(field: &str, value_type: FieldType, literal: &Literal) -> Result<TypedValue, TranslateError> {
    let text = literal.as_text();
    let coerced = match value_type {
        FieldType::String => Some(TypedValue::Text(text.to_string())),
        FieldType::Number => parse_number(text),
        FieldType::Bool => match text {
            "true" => Some(TypedValue::Bool(true)),
            "false" => Some(TypedValue::Bool(false)),
            _ => None,
        },
        FieldType::Date => parse_date(text).map(TypedValue::Date),
    };

    coerced.ok_or_else(|| TranslateError::TypeCoercion {
        field: field.to_string(),
        value: text.to_string(),
        expected_type: value_type,
    })
}

/// 只接受 `-?\d+(\.\d+)?`：整数溢出 i64 时拒绝，不退化为小数
fn parse_number(text: &str) -> Option<TypedValue> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }

    match frac_part {
        None => text.parse::<i64>().ok().map(TypedValue::Integer),
        Some(_) => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(TypedValue::Decimal),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // chrono 接受不补零、带空格或带符号的年月日，这里逐字节要求 YYYY-MM-DD
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}
