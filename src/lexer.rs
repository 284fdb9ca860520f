use std::fmt;

use crate::ast::Token;

/// 1-based line/column of a token's first rune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Decides whether `ch` may appear at `index` within an identifier.
pub type IdentPolicy = fn(ch: char, index: usize) -> bool;

/// Runes that terminate identifiers and are scanned as single structural tokens.
pub const RESERVED: &[char] = &[
    '@', '$', '&', '.', ',', '=', '>', '<', '|', '!', '#', ';', '/', '*', '?', '"', '\'', '`',
    '(', ')', '[', ']', '{', '}',
];

/// Identifier runes: anything that is not whitespace or reserved. The first
/// rune may not be a digit or `-` so numbers keep their own token.
pub fn default_ident_rune(ch: char, index: usize) -> bool {
    if ch.is_whitespace() || RESERVED.contains(&ch) {
        return false;
    }
    index > 0 || !(ch.is_ascii_digit() || ch == '-')
}

/// A token together with where it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}

/// Pulls tokens on demand from query text.
///
/// Malformed input never fails here: it comes back as [`Token::Invalid`] and
/// the parser reports it as a structural error at the token's position.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    ident_rune: IdentPolicy,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_policy(input, default_ident_rune)
    }

    pub fn with_policy(input: &str, ident_rune: IdentPolicy) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            ident_rune,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Skips whitespace and comments. Returns an invalid token for an
    /// unterminated block comment.
    fn skip_trivia(&mut self) -> Option<Token> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => {
                                return Some(Token::Invalid("unterminated comment".to_string()));
                            }
                        }
                    }
                }
                _ => return None,
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if (self.ident_rune)(ch, result.chars().count()) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Token {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Token::String(result);
                }
                '\n' => return Token::Invalid("newline in string literal".to_string()),
                '\\' => {
                    self.advance();
                    let escaped = match self.current_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some('/') => '/',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('u') => match self.read_unicode_escape() {
                            Some(c) => c,
                            None => return Token::Invalid("invalid unicode escape".to_string()),
                        },
                        Some(other) => {
                            return Token::Invalid(format!("invalid escape sequence \\{other}"));
                        }
                        None => break,
                    };
                    result.push(escaped);
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Token::Invalid("unterminated string literal".to_string())
    }

    /// Reads the four hex digits after `\u`, leaving the cursor on the last one.
    fn read_unicode_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            self.advance();
            code = code * 16 + self.current_char()?.to_digit(16)?;
        }
        char::from_u32(code)
    }

    fn read_raw_string(&mut self) -> Token {
        let mut result = String::new();
        self.advance(); // opening backtick

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '`' {
                return Token::String(result);
            }
            result.push(ch);
        }

        Token::Invalid("unterminated raw string literal".to_string())
    }

    /// Scans `-?digits(.digits)?([eE][+-]?digits)?`, keeping the text as written.
    fn read_number(&mut self) -> Token {
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }
        self.read_digits(&mut number);

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let sign = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    number.push(self.current_char().unwrap_or_default());
                    self.advance();
                }
                self.read_digits(&mut number);
            }
        }

        // A number glued to identifier runes ("12ab") is malformed.
        if let Some(ch) = self.current_char()
            && (self.ident_rune)(ch, 1)
            && ch != '-'
        {
            let tail = self.read_identifier();
            return Token::Invalid(format!("{number}{tail}"));
        }

        Token::Number(number)
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Spanned {
        if let Some(invalid) = self.skip_trivia() {
            return Spanned {
                token: invalid,
                position: self.here(),
            };
        }

        let position = self.here();
        let token = match self.current_char() {
            None => Token::Eof,
            Some(q @ ('"' | '\'')) => self.read_string(q),
            Some('`') => self.read_raw_string(),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()
            }
            Some(ch) if (self.ident_rune)(ch, 0) => Token::Ident(self.read_identifier()),
            Some(ch) => {
                self.advance();
                Token::Rune(ch)
            }
        };

        Spanned { token, position }
    }
}

#[test]
fn test_structural_runes() {
    let mut lexer = Lexer::new("$.list[@]");
    let kinds: Vec<Token> = std::iter::from_fn(|| {
        let t = lexer.next_token().token;
        (t != Token::Eof).then_some(t)
    })
    .collect();
    assert_eq!(
        kinds,
        vec![
            Token::Rune('$'),
            Token::Rune('.'),
            Token::Ident("list".to_string()),
            Token::Rune('['),
            Token::Rune('@'),
            Token::Rune(']'),
        ]
    );
}

#[test]
fn test_positions_track_lines() {
    let mut lexer = Lexer::new("$\n  .name");
    assert_eq!(lexer.next_token().position, Position { line: 1, column: 1 });
    assert_eq!(lexer.next_token().position, Position { line: 2, column: 3 });
    assert_eq!(lexer.next_token().position, Position { line: 2, column: 4 });
}
