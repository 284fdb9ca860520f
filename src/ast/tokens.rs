use std::fmt;

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier: field names, function names, `AND`/`OR`, `true`/`false`
    ///
    /// # Examples
    /// ```text
    /// list
    /// Equal
    /// first-name
    /// ```
    Ident(String),

    /// Integer or decimal literal, kept as scanned
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1.50
    /// 2e3
    /// ```
    Number(String),

    /// Quoted or raw string literal, unescaped
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'single'
    /// `raw \d+`
    /// ```
    String(String),

    /// Any single structural rune: `$ @ . , [ ] ( ) { }` and the other
    /// reserved punctuation
    Rune(char),

    /// Malformed input (unterminated string, bad escape, ...)
    ///
    /// The lexer never fails; the parser turns this into a positioned error.
    Invalid(String),

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => f.write_str(s),
            Token::Number(n) => f.write_str(n),
            Token::String(s) => f.write_str(&super::quote(s)),
            Token::Rune(c) => write!(f, "{c}"),
            Token::Invalid(reason) => write!(f, "malformed token ({reason})"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
