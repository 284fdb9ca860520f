use crate::{
    ast::{
        Filter, Function, FunctionRef, LogicalOperation, LogicalOperator, Operation, Parameter,
        Path, PathIdent, PathPart, Token,
    },
    functions::FunctionName,
    lexer::{Lexer, Position, Spanned},
    value::parse_decimal,
};

/// Structural errors. Parsing stops at the first one; no partial tree is
/// returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found} at {position}: expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
        position: Position,
    },

    #[error("malformed token at {position}: {reason}")]
    Malformed { reason: String, position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("invalid next character '{found}': must be '@' at {position}")]
    MustBeCurrent { found: char, position: Position },

    #[error("cannot use '$' (root) inside filter: {0}")]
    RootInFilter(#[source] Box<ParseError>),

    #[error("unexpected {found} at {position}: a query is a single path or group")]
    TrailingInput { found: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Unexpected { position, .. }
            | ParseError::Malformed { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::MustBeCurrent { position, .. }
            | ParseError::TrailingInput { position, .. } => *position,
            ParseError::RootInFilter(inner) => inner.position(),
        }
    }
}

/// Where a path appears, which decides the flags it is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathRole {
    /// The whole query
    Query,
    /// Operand of a logical group outside any filter
    Operand,
    /// Operand of a filter body, directly or through nested groups
    FilterOperand,
    /// Function argument
    Argument,
}

/// Recursive-descent parser over a [`Lexer`].
///
/// # Examples
///
/// ```
/// use mpath::parser::Parser;
/// use mpath::lexer::Lexer;
///
/// let mut parser = Parser::new(Lexer::new("$.list[@.id.Equal(1)].First().name"));
/// let query = parser.parse().unwrap();
///
/// assert_eq!(query.to_string(), "$.list[@.id.Equal(1)].First().name");
/// ```
pub struct Parser {
    lexer: Lexer,
    current: Spanned,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        Parser { lexer, current }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn check_rune(&self, rune: char) -> bool {
        self.current.token == Token::Rune(rune)
    }

    fn expect_rune(&mut self, rune: char, expected: &'static str) -> Result<(), ParseError> {
        if !self.check_rune(rune) {
            return Err(self.unexpected(expected));
        }
        self.advance();
        Ok(())
    }

    /// Error for the current token. Malformed tokens report their own reason.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let position = self.current.position;
        match &self.current.token {
            Token::Invalid(reason) => ParseError::Malformed {
                reason: reason.clone(),
                position,
            },
            token => ParseError::Unexpected {
                found: describe(token),
                expected,
                position,
            },
        }
    }

    /// Parses one complete query; anything after it is an error.
    pub fn parse(&mut self) -> Result<Operation, ParseError> {
        let operation = match self.current.token {
            Token::Rune('{') => Operation::Logical(self.parse_logical(false)?),
            Token::Rune('$' | '@') => Operation::Path(self.parse_path(PathRole::Query)?),
            _ => return Err(self.unexpected("'{', '$' or '@'")),
        };

        match &self.current.token {
            Token::Eof => Ok(operation),
            Token::Invalid(_) => Err(self.unexpected("end of input")),
            token => Err(ParseError::TrailingInput {
                found: describe(token),
                position: self.current.position,
            }),
        }
    }

    fn parse_path(&mut self, role: PathRole) -> Result<Path, ParseError> {
        let is_filter_body = role == PathRole::FilterOperand;
        let start_at_root = match self.current.token {
            Token::Rune('$') if is_filter_body => {
                return Err(ParseError::RootInFilter(Box::new(ParseError::MustBeCurrent {
                    found: '$',
                    position: self.current.position,
                })));
            }
            Token::Rune('$') => true,
            Token::Rune('@') => false,
            _ => return Err(self.unexpected("'$' or '@'")),
        };
        self.advance();

        let mut parts = Vec::new();
        loop {
            match self.current.token {
                Token::Rune('.') => {
                    self.advance();
                    parts.push(self.parse_segment()?);
                }
                Token::Rune('[') => parts.push(PathPart::Filter(self.parse_filter()?)),
                _ => break,
            }
        }

        Ok(Path {
            parts,
            start_at_root,
            is_filter_body,
            must_end_in_predicate: matches!(role, PathRole::Operand | PathRole::FilterOperand),
        })
    }

    /// A field name or function call after `.`.
    fn parse_segment(&mut self) -> Result<PathPart, ParseError> {
        let Token::Ident(name) = &self.current.token else {
            return Err(self.unexpected("a field or function name"));
        };
        let name = name.clone();
        self.advance();

        if self.check_rune('(') {
            Ok(PathPart::Function(self.parse_function(name)?))
        } else {
            Ok(PathPart::Ident(PathIdent::new(name)))
        }
    }

    fn parse_filter(&mut self) -> Result<Filter, ParseError> {
        self.expect_rune('[', "'['")?;

        let predicate = match self.current.token {
            Token::Rune('{') => self.parse_logical(true)?,
            Token::Rune('$' | '@') => LogicalOperation::implicit(Operation::Path(
                self.parse_path(PathRole::FilterOperand)?,
            )),
            _ => return Err(self.unexpected("'{' or '@'")),
        };

        self.expect_rune(']', "']'")?;
        Ok(Filter { predicate })
    }

    /// `{[AND|OR,] operand (, operand)*}`. Any other word in operator
    /// position is kept as an invalid operator.
    fn parse_logical(&mut self, in_filter: bool) -> Result<LogicalOperation, ParseError> {
        self.expect_rune('{', "'{'")?;

        let mut operator = LogicalOperator::And;
        let mut explicit_operator = false;
        if let Token::Ident(word) = &self.current.token {
            operator = match word.to_ascii_uppercase().as_str() {
                "AND" => LogicalOperator::And,
                "OR" => LogicalOperator::Or,
                _ => LogicalOperator::Invalid(word.clone()),
            };
            explicit_operator = true;
            self.advance();
            self.expect_rune(',', "',' after the operator")?;
        }

        let role = if in_filter {
            PathRole::FilterOperand
        } else {
            PathRole::Operand
        };
        let mut operands = Vec::new();
        loop {
            let operand = match self.current.token {
                Token::Rune('{') => Operation::Logical(self.parse_logical(in_filter)?),
                Token::Rune('$' | '@') => Operation::Path(self.parse_path(role)?),
                _ => return Err(self.unexpected("a path or '{'")),
            };
            operands.push(operand);

            match self.current.token {
                Token::Rune(',') => self.advance(),
                Token::Rune('}') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }

        Ok(LogicalOperation {
            operator,
            operands,
            explicit_operator,
            grouped: true,
        })
    }

    fn parse_function(&mut self, name: String) -> Result<Function, ParseError> {
        self.expect_rune('(', "'('")?;

        let name = match FunctionName::lookup(&name) {
            Some(known) => FunctionRef::Known(known),
            None => FunctionRef::Unknown(name),
        };

        let mut parameters = Vec::new();
        if self.check_rune(')') {
            self.advance();
            return Ok(Function { name, parameters });
        }

        loop {
            parameters.push(self.parse_argument()?);
            match self.current.token {
                Token::Rune(',') => self.advance(),
                Token::Rune(')') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }

        Ok(Function { name, parameters })
    }

    fn parse_argument(&mut self) -> Result<Parameter, ParseError> {
        let position = self.current.position;
        let parameter = match &self.current.token {
            Token::Number(text) => {
                let value = parse_decimal(text).map_err(|_| ParseError::InvalidNumber {
                    text: text.clone(),
                    position,
                })?;
                Parameter::Number {
                    value,
                    text: text.clone(),
                }
            }
            Token::String(s) => Parameter::String(s.clone()),
            Token::Ident(word) if word == "true" => Parameter::Bool(true),
            Token::Ident(word) if word == "false" => Parameter::Bool(false),
            Token::Rune('$' | '@') => return Ok(Parameter::Path(self.parse_path(PathRole::Argument)?)),
            _ => return Err(self.unexpected("a number, string, bool or path")),
        };
        self.advance();
        Ok(parameter)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Eof => token.to_string(),
        Token::Rune(c) => format!("'{c}'"),
        Token::Ident(s) | Token::Number(s) => format!("'{s}'"),
        Token::String(_) => format!("string {token}"),
        Token::Invalid(_) => token.to_string(),
    }
}

/// Parses query text into an operation tree.
pub fn parse(text: &str) -> Result<Operation, ParseError> {
    Parser::new(Lexer::new(text)).parse()
}
