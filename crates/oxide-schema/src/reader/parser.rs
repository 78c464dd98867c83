//! Parsers turning stored `CREATE TABLE` and `CREATE INDEX` text into
//! definitions.

use oxide_schema_core::{
    DefaultValue, FieldAttribute, FieldDefinition, IndexDefinition, IndexKind, TypeDefinition,
    TypeKind,
};
use tracing::debug;

use super::lexer::{split_on_commas, Lexer, SyntaxError, Token};

/// Name of the index holding a table's primary key.
pub const PRIMARY_INDEX_NAME: &str = "PRIMARY";

/// Fields and primary key read from a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    /// Columns in declaration order.
    pub fields: Vec<FieldDefinition>,
    /// The primary key, inline or table-level.
    pub primary: Option<IndexDefinition>,
}

/// Cursor over a token slice.
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    const fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matches = keywords
            .iter()
            .enumerate()
            .all(|(i, kw)| self.tokens.get(self.pos + i).is_some_and(|t| t.is_keyword(kw)));
        if matches {
            self.pos += keywords.len();
        }
        matches
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), SyntaxError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_name(&mut self, what: &'static str) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Token::Word(s) | Token::Identifier(s) | Token::Quoted(s)) => {
                self.pos += 1;
                Ok(s.clone())
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_group(&mut self, what: &'static str) -> Result<&'t str, SyntaxError> {
        match self.peek() {
            Some(Token::Group(content)) => {
                self.pos += 1;
                Ok(content)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        SyntaxError::Expected {
            expected,
            found: self
                .peek()
                .map_or_else(|| "end of statement".to_string(), Token::describe),
        }
    }
}

/// Parses a `CREATE TABLE` statement.
///
/// # Errors
///
/// Returns an error when the statement uses a type or constraint that a
/// [`FieldDefinition`] cannot express.
pub fn parse_create_table(sql: &str) -> Result<ParsedTable, SyntaxError> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut cursor = Cursor::new(&tokens);

    cursor.expect_keyword("CREATE")?;
    if !cursor.eat_keyword("TEMP") {
        cursor.eat_keyword("TEMPORARY");
    }
    cursor.expect_keyword("TABLE")?;
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    cursor.expect_name("table name")?;
    let body = cursor.expect_group("column definitions")?;

    let mut fields = Vec::new();
    let mut primary = None;

    for definition in split_on_commas(Lexer::new(body).tokenize()?) {
        let mut cursor = Cursor::new(&definition);
        if cursor.eat_keyword("CONSTRAINT") {
            cursor.expect_name("constraint name")?;
        }

        if cursor.eat_keywords(&["PRIMARY", "KEY"]) {
            let columns = parse_column_list(cursor.expect_group("primary key columns")?)?;
            set_primary(&mut primary, columns)?;
        } else if ["UNIQUE", "CHECK", "FOREIGN"]
            .iter()
            .any(|kw| cursor.peek().is_some_and(|t| t.is_keyword(kw)))
        {
            // Table constraints other than the primary key have no counterpart.
            debug!("Ignoring table constraint in `{sql}`");
        } else {
            let (field, inline_primary) = parse_column(&mut cursor)?;
            if inline_primary {
                set_primary(&mut primary, vec![field.name().to_string()])?;
            }
            fields.push(field);
        }
    }

    Ok(ParsedTable { fields, primary })
}

fn set_primary(
    primary: &mut Option<IndexDefinition>,
    columns: Vec<String>,
) -> Result<(), SyntaxError> {
    if primary.is_some() {
        return Err(SyntaxError::DuplicatePrimaryKey);
    }
    *primary = Some(IndexDefinition::new(
        PRIMARY_INDEX_NAME,
        columns,
        IndexKind::Primary,
    )?);
    Ok(())
}

/// Maps a declared type keyword to its kind.
fn type_kind(keyword: &str) -> Option<TypeKind> {
    let kind = match keyword.to_ascii_uppercase().as_str() {
        "INT" | "INTEGER" => TypeKind::Integer,
        "BIGINT" => TypeKind::BigInt,
        "TINYINT" => TypeKind::TinyInt,
        "FLOAT" | "REAL" | "DOUBLE" => TypeKind::Float,
        "DECIMAL" | "NUMERIC" => TypeKind::Decimal,
        "BLOB" | "TEXT" => TypeKind::Blob,
        "VARCHAR" | "CHAR" => TypeKind::Varchar,
        _ => return None,
    };
    Some(kind)
}

/// Parses one column definition; the flag is set for an inline primary key.
fn parse_column(cursor: &mut Cursor<'_>) -> Result<(FieldDefinition, bool), SyntaxError> {
    let name = cursor.expect_name("column name")?;

    let keyword = match cursor.next() {
        Some(Token::Word(w)) => w,
        other => {
            return Err(SyntaxError::Expected {
                expected: "column type",
                found: other.map_or_else(|| "end of definition".to_string(), Token::describe),
            })
        }
    };
    let kind = type_kind(keyword).ok_or_else(|| SyntaxError::UnknownType(keyword.clone()))?;
    cursor.eat_keyword("PRECISION");

    let mut type_def = TypeDefinition::new(kind);
    if let Some(Token::Group(size)) = cursor.peek() {
        cursor.next();
        if kind.takes_size() {
            let size = size
                .trim()
                .parse::<u32>()
                .map_err(|_| SyntaxError::InvalidSize(size.clone()))?;
            type_def = TypeDefinition::sized(kind, size)?;
        }
    }

    let mut field = FieldDefinition::new(name, type_def)?;
    let mut inline_primary = false;

    while let Some(token) = cursor.next() {
        if token.is_keyword("UNSIGNED") {
            field = field.attribute(FieldAttribute::Unsigned);
        } else if token.is_keyword("PRIMARY") {
            cursor.expect_keyword("KEY")?;
            if !cursor.eat_keyword("ASC") {
                cursor.eat_keyword("DESC");
            }
            inline_primary = true;
        } else if token.is_keyword("AUTOINCREMENT") {
            field = field.auto_increment();
        } else if token.is_keyword("NOT") {
            cursor.expect_keyword("NULL")?;
            field = field.not_null();
        } else if token.is_keyword("NULL") {
            field = field.nullable(true);
        } else if token.is_keyword("DEFAULT") {
            let value = cursor
                .next()
                .ok_or_else(|| cursor.unexpected("default value"))?;
            field = field.default(parse_default(value));
        } else if token.is_keyword("CONSTRAINT") || token.is_keyword("COLLATE") {
            cursor.expect_name("name")?;
        } else {
            return Err(SyntaxError::UnsupportedConstraint(token.describe()));
        }
    }

    Ok((field, inline_primary))
}

/// Reads a stored default back into a value.
fn parse_default(token: &Token) -> DefaultValue {
    match token {
        Token::Quoted(s) | Token::Identifier(s) => DefaultValue::String(s.clone()),
        Token::Group(expr) => DefaultValue::Expression(expr.clone()),
        Token::Word(w) if w.eq_ignore_ascii_case("NULL") => DefaultValue::Null,
        Token::Word(w) => {
            if let Ok(i) = w.parse::<i64>() {
                return DefaultValue::Integer(i);
            }
            let looks_float = w.contains(['.', 'e', 'E']);
            match w.parse::<f64>() {
                Ok(f) if looks_float && f.is_finite() => DefaultValue::Float(f),
                _ => DefaultValue::Expression(w.clone()),
            }
        }
        Token::Comma => DefaultValue::Expression(",".to_string()),
    }
}

/// Parses `a, "b" DESC` into column names.
fn parse_column_list(content: &str) -> Result<Vec<String>, SyntaxError> {
    split_on_commas(Lexer::new(content).tokenize()?)
        .iter()
        .map(|part| {
            part.first()
                .and_then(Token::text)
                .map(ToString::to_string)
                .ok_or_else(|| SyntaxError::Expected {
                    expected: "column name",
                    found: format!("({content})"),
                })
        })
        .collect()
}

/// Parses a `CREATE [UNIQUE] INDEX` statement.
///
/// # Errors
///
/// Returns an error when the statement is not an index definition.
pub fn parse_create_index(sql: &str) -> Result<IndexDefinition, SyntaxError> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut cursor = Cursor::new(&tokens);

    cursor.expect_keyword("CREATE")?;
    let kind = if cursor.eat_keyword("UNIQUE") {
        IndexKind::Unique
    } else {
        IndexKind::Index
    };
    cursor.expect_keyword("INDEX")?;
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let name = cursor.expect_name("index name")?;
    cursor.expect_keyword("ON")?;
    cursor.expect_name("table name")?;
    let columns = parse_column_list(cursor.expect_group("index columns")?)?;

    Ok(IndexDefinition::new(name, columns, kind)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_table() {
        let parsed = parse_create_table(
            "CREATE TABLE dbNametableName (primaryField INT NOT NULL, textField BLOB NULL, \
             intField INT DEFAULT 42 NOT NULL, PRIMARY KEY (textField, primaryField))",
        )
        .unwrap();

        assert_eq!(
            parsed.fields,
            vec![
                FieldDefinition::new("primaryField", TypeKind::Integer)
                    .unwrap()
                    .not_null(),
                FieldDefinition::new("textField", TypeKind::Blob).unwrap(),
                FieldDefinition::new("intField", TypeKind::Integer)
                    .unwrap()
                    .not_null()
                    .default(DefaultValue::Integer(42)),
            ]
        );
        assert_eq!(
            parsed.primary,
            Some(
                IndexDefinition::new(
                    PRIMARY_INDEX_NAME,
                    ["textField", "primaryField"],
                    IndexKind::Primary
                )
                .unwrap()
            )
        );
    }

    #[test]
    fn test_parse_autoincrement() {
        let parsed = parse_create_table(
            "CREATE TABLE autoinc_field (autoinc INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL)",
        )
        .unwrap();

        let field = &parsed.fields[0];
        assert!(field.is_auto_increment());
        assert!(!field.is_nullable());
        assert_eq!(field.type_def().kind(), TypeKind::Integer);
        assert_eq!(
            parsed.primary.unwrap().columns(),
            &["autoinc".to_string()]
        );
    }

    #[test]
    fn test_parse_types() {
        let parsed = parse_create_table(
            "CREATE TABLE IF NOT EXISTS \"t\" (a VARCHAR(32) NULL, b varchar NULL, \
             c DECIMAL(10, 2) NULL, d BIGINT UNSIGNED NOT NULL, e TINYINT NULL, \
             f FLOAT NULL, g DOUBLE PRECISION NULL, h TEXT NULL)",
        )
        .unwrap();

        let kinds: Vec<TypeDefinition> = parsed.fields.iter().map(|f| *f.type_def()).collect();
        assert_eq!(
            kinds,
            vec![
                TypeDefinition::varchar(32),
                TypeDefinition::new(TypeKind::Varchar),
                TypeDefinition::new(TypeKind::Decimal),
                TypeDefinition::new(TypeKind::BigInt),
                TypeDefinition::new(TypeKind::TinyInt),
                TypeDefinition::new(TypeKind::Float),
                TypeDefinition::new(TypeKind::Float),
                TypeDefinition::new(TypeKind::Blob),
            ]
        );
        assert!(parsed.fields[3].has_attribute(FieldAttribute::Unsigned));
        assert!(parsed.primary.is_none());
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = parse_create_table(
            "CREATE TABLE t (a INT DEFAULT -7 NULL, b FLOAT DEFAULT 1.5 NULL, \
             c BLOB DEFAULT 'it''s' NULL, d BLOB DEFAULT NULL NULL, \
             e INT DEFAULT CURRENT_TIMESTAMP NULL, f INT DEFAULT (1 + 2) NULL, \
             g FLOAT DEFAULT 1e3 NULL)",
        )
        .unwrap();

        let defaults: Vec<DefaultValue> = parsed
            .fields
            .iter()
            .map(|f| f.default_value().clone())
            .collect();
        assert_eq!(
            defaults,
            vec![
                DefaultValue::Integer(-7),
                DefaultValue::Float(1.5),
                DefaultValue::String("it's".to_string()),
                DefaultValue::Null,
                DefaultValue::Expression("CURRENT_TIMESTAMP".to_string()),
                DefaultValue::Expression("1 + 2".to_string()),
                DefaultValue::Float(1000.0),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_create_table("CREATE TABLE t (a GEOMETRY NULL)"),
            Err(SyntaxError::UnknownType(t)) if t == "GEOMETRY"
        ));
        assert!(matches!(
            parse_create_table("CREATE TABLE t (a INT REFERENCES other)"),
            Err(SyntaxError::UnsupportedConstraint(c)) if c == "REFERENCES"
        ));
        assert!(matches!(
            parse_create_table("CREATE TABLE t (a INT PRIMARY KEY, PRIMARY KEY (a))"),
            Err(SyntaxError::DuplicatePrimaryKey)
        ));
        assert!(matches!(
            parse_create_table("CREATE VIEW v AS SELECT 1"),
            Err(SyntaxError::Expected { expected: "TABLE", .. })
        ));
        assert!(matches!(
            parse_create_table("CREATE TABLE t (a)"),
            Err(SyntaxError::Expected { expected: "column type", .. })
        ));
    }

    #[test]
    fn test_parse_create_index() {
        assert_eq!(
            parse_create_index("CREATE INDEX indexName ON dbNametableName (intField,textField)")
                .unwrap(),
            IndexDefinition::new("indexName", ["intField", "textField"], IndexKind::Index)
                .unwrap()
        );
        assert_eq!(
            parse_create_index("CREATE UNIQUE INDEX IF NOT EXISTS \"u\" ON t (\"a\" DESC, b ASC)")
                .unwrap(),
            IndexDefinition::new("u", ["a", "b"], IndexKind::Unique).unwrap()
        );
        assert!(parse_create_index("CREATE INDEX i ON t").is_err());
    }
}
