//! SQLite value escaping.

use oxide_schema_core::{DefaultValue, Escaper};

/// Renders default values as SQLite literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEscaper;

impl SqliteEscaper {
    /// Creates a new escaper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Escaper for SqliteEscaper {
    fn escape_value(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::None | DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => float_literal(*f),
            DefaultValue::String(s) => quote_string(s),
            DefaultValue::Expression(expr) if is_bare_keyword(expr) => expr.clone(),
            DefaultValue::Expression(expr) => format!("({expr})"),
        }
    }
}

/// `CURRENT_TIMESTAMP` and the like; anything else is parenthesised so it
/// cannot read back as a literal.
fn is_bare_keyword(expr: &str) -> bool {
    expr.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !expr.eq_ignore_ascii_case("NULL")
}

/// Quotes a string literal, doubling embedded single quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Floats always carry a fraction or exponent so they read back as floats.
fn float_literal(value: f64) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        "NULL".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_values() {
        let e = SqliteEscaper::new();
        assert_eq!(e.escape_value(&DefaultValue::Null), "NULL");
        assert_eq!(e.escape_value(&DefaultValue::Integer(42)), "42");
        assert_eq!(e.escape_value(&DefaultValue::Integer(-7)), "-7");
        assert_eq!(e.escape_value(&DefaultValue::Float(3.0)), "3.0");
        assert_eq!(e.escape_value(&DefaultValue::Float(0.25)), "0.25");
        assert_eq!(
            e.escape_value(&DefaultValue::String("it's".to_string())),
            "'it''s'"
        );
        assert_eq!(
            e.escape_value(&DefaultValue::Expression("CURRENT_TIMESTAMP".to_string())),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_expressions_are_parenthesised() {
        let e = SqliteEscaper::new();
        for (expr, expected) in [
            ("-1", "(-1)"),
            ("1 + 2", "(1 + 2)"),
            ("'x'", "('x')"),
            ("null", "(null)"),
            ("(1 + 2)", "((1 + 2))"),
        ] {
            assert_eq!(
                e.escape_value(&DefaultValue::Expression(expr.to_string())),
                expected
            );
        }
    }
}
