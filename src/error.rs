//! Client-input errors of the filter pipeline and their 4xx payload.

use serde::Serialize;
use thiserror::Error;

use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::translator::TranslateError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// Body returned to the client when a query is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub reason: String,
}

impl QueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Lex(_) => "LexError",
            QueryError::Parse(_) => "ParseError",
            QueryError::Translate(TranslateError::UnknownField { .. }) => "UnknownFieldError",
            QueryError::Translate(TranslateError::TypeCoercion { .. }) => "TypeCoercionError",
        }
    }

    /// Every pipeline error is the caller's fault.
    pub fn status(&self) -> u16 {
        400
    }

    pub fn body(&self) -> ErrorBody {
        let (position, field) = match self {
            QueryError::Lex(e) => (Some(e.position), None),
            QueryError::Parse(e) => (Some(e.position), None),
            QueryError::Translate(e) => (None, Some(e.field().to_string())),
        };
        ErrorBody {
            kind: self.kind(),
            position,
            field,
            reason: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::FieldType;

    #[test]
    fn test_kinds() {
        let err: QueryError = TranslateError::TypeCoercion {
            field: "age".into(),
            value: "x".into(),
            expected_type: FieldType::Number,
        }
        .into();
        assert_eq!(err.kind(), "TypeCoercionError");
        assert_eq!(err.status(), 400);

        let err: QueryError = TranslateError::UnknownField { field: "ghost".into() }.into();
        assert_eq!(err.kind(), "UnknownFieldError");
    }

    #[test]
    fn test_body_for_parse_error() {
        let err: QueryError = ParseError {
            position: 5,
            expected: "literal value".into(),
            found: "end of input".into(),
        }
        .into();
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "ParseError",
                "position": 5,
                "reason": "parse error at position 5: expected literal value, found end of input",
            })
        );
    }

    #[test]
    fn test_body_for_translate_error() {
        let err: QueryError = TranslateError::UnknownField { field: "ghost".into() }.into();
        let body = err.body();
        assert_eq!(body.field.as_deref(), Some("ghost"));
        assert_eq!(body.position, None);
        assert_eq!(body.reason, "unknown field 'ghost'");
    }
}
