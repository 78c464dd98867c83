//! Tokenizer for stored SQLite DDL.
//!
//! The catalog keeps DDL as text, so reading a definition back only needs a
//! coarse token stream: words, quoted text and parenthesised groups, whose
//! content is tokenized again on demand.

use oxide_schema_core::DefinitionError;

/// A stored statement could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// Quoted text without its closing quote.
    #[error("unterminated quoted text starting at byte {0}")]
    UnterminatedQuote(usize),

    /// A `(` without its `)`, or a stray `)`.
    #[error("unbalanced parenthesis at byte {0}")]
    UnbalancedParenthesis(usize),

    /// Something else was found where a token was expected.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// What the parser was looking for.
        expected: &'static str,
        /// What it found instead.
        found: String,
    },

    /// A column type this crate cannot represent.
    #[error("unknown column type '{0}'")]
    UnknownType(String),

    /// A column constraint this crate cannot represent.
    #[error("unsupported column constraint '{0}'")]
    UnsupportedConstraint(String),

    /// A size that is not an unsigned integer.
    #[error("invalid type size '{0}'")]
    InvalidSize(String),

    /// A table declares its primary key twice.
    #[error("more than one PRIMARY KEY")]
    DuplicatePrimaryKey,

    /// The parsed pieces do not form a valid definition.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// A DDL token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word: keyword, name, number or operator run.
    Word(String),
    /// A single-quoted string literal, unescaped.
    Quoted(String),
    /// A double-quoted, backticked or bracketed identifier, unescaped.
    Identifier(String),
    /// The raw text between a pair of parentheses.
    Group(String),
    /// `,`
    Comma,
}

impl Token {
    /// Returns the text of a word, literal or identifier.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Word(s) | Self::Quoted(s) | Self::Identifier(s) => Some(s),
            Self::Group(_) | Self::Comma => None,
        }
    }

    /// Whether this is the given keyword, ignoring case.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// Returns the token as it would read in SQL, for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Word(s) => s.clone(),
            Self::Quoted(s) => format!("'{s}'"),
            Self::Identifier(s) => format!("\"{s}\""),
            Self::Group(s) => format!("({s})"),
            Self::Comma => ",".to_string(),
        }
    }
}

/// A lexer that tokenizes stored DDL.
pub struct Lexer<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole input.
    ///
    /// # Errors
    ///
    /// Returns an error on unterminated quotes and unbalanced parentheses.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let Some(c) = self.peek() else {
                return Ok(tokens);
            };
            let token = match c {
                ',' => {
                    self.advance();
                    Token::Comma
                }
                '(' => self.scan_group()?,
                ')' => return Err(SyntaxError::UnbalancedParenthesis(self.pos)),
                '\'' => Token::Quoted(self.scan_quoted('\'')?),
                '"' => Token::Identifier(self.scan_quoted('"')?),
                '`' => Token::Identifier(self.scan_quoted('`')?),
                '[' => Token::Identifier(self.scan_quoted(']')?),
                _ => self.scan_word(),
            };
            tokens.push(token);
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    const fn is_delimiter(c: char) -> bool {
        matches!(c, '(' | ')' | ',' | '\'' | '"' | '`' | '[')
    }

    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !Self::is_delimiter(c))
        {
            self.advance();
        }
        Token::Word(self.input[start..self.pos].to_string())
    }

    /// Scans quoted text up to `close`; a doubled closing quote stands for itself.
    fn scan_quoted(&mut self, close: char) -> Result<String, SyntaxError> {
        let start = self.pos;
        self.advance();

        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if close != ']' && self.peek() == Some(close) {
                        value.push(close);
                        self.advance();
                    } else {
                        return Ok(value);
                    }
                }
                Some(c) => value.push(c),
                None => return Err(SyntaxError::UnterminatedQuote(start)),
            }
        }
    }

    /// Scans a parenthesised group, keeping its inner text verbatim.
    fn scan_group(&mut self) -> Result<Token, SyntaxError> {
        let start = self.pos;
        self.advance();
        let content_start = self.pos;
        let mut depth = 1usize;

        while depth > 0 {
            match self.peek() {
                Some('(') => {
                    depth += 1;
                    self.advance();
                }
                Some(')') => {
                    depth -= 1;
                    self.advance();
                }
                Some('\'') => {
                    self.scan_quoted('\'')?;
                }
                Some('"') => {
                    self.scan_quoted('"')?;
                }
                Some('`') => {
                    self.scan_quoted('`')?;
                }
                Some(_) => {
                    self.advance();
                }
                None => return Err(SyntaxError::UnbalancedParenthesis(start)),
            }
        }

        let content = &self.input[content_start..self.pos - 1];
        Ok(Token::Group(content.to_string()))
    }
}

/// Splits tokens on commas.
#[must_use]
pub fn split_on_commas(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut parts = vec![Vec::new()];
    for token in tokens {
        match token {
            Token::Comma => parts.push(Vec::new()),
            other => {
                if let Some(last) = parts.last_mut() {
                    last.push(other);
                }
            }
        }
    }
    parts.retain(|part| !part.is_empty());
    parts
}
