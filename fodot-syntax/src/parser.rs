//! Implements a parser for vocabularies, theories and knowledge bases.
//!
//! The module provides the parser by implementing [`FromStr`] for [`KnowledgeBase`] and
//! [`Expr`]. The parser is often used implicitly through the [`parse`] method.
//!
//! **Example**:
//! ```rust
//! use fodot_syntax::syntax::KnowledgeBase;
//!
//! let kb: KnowledgeBase = r#"
//!     vocabulary {
//!         type Color constructed from {red, green, blue}
//!         col : Color.
//!         a : Int;
//!     }
//!     theory {
//!         col ~= red.
//!         0 < a < 6;
//!     }
//! "#.parse().unwrap();
//!
//! assert_eq!("type Color constructed from {red, green, blue}\ncol : Color\na : Int",
//!     kb.vocabulary.to_string());
//! assert_eq!("col ≠ red\n(0 < a) ∧ (a < 6)", kb.theory.to_string());
//! ```
//!
//! Both `.` and `;` terminate declarations and statements.
//!
//! [`KnowledgeBase`]: crate::syntax::KnowledgeBase
//! [`Expr`]: crate::syntax::Expr
//! [`FromStr`]: std::str::FromStr
//! [`parse`]: ::std::str#parse
use super::syntax::{Expr, KnowledgeBase, Position};
use lalrpop_util::ParseError;
use std::str::FromStr;
use thiserror::Error;

lalrpop_mod!(pub grammar); // synthesized by LALRPOP

#[derive(PartialEq, Debug)]
pub enum TokenType {
    Comma,
    Dot,
    Dots,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Times,
    Plus,
    Minus,
    Arrow,
    Hash,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Not,
    And,
    Or,
    Implies,
    Implied,
    Iff,
    Forall,
    Exists,
    Vocabulary,
    Theory,
    Type,
    Constructed,
    From,
    In,
    True,
    False,
    Name,
    Number,
    Unknown,
}

impl<S: AsRef<str>> From<S> for TokenType {
    fn from(s: S) -> Self {
        match s.as_ref() {
            "_COMMA_" => Self::Comma,
            "_DOT_" => Self::Dot,
            "_DOTS_" => Self::Dots,
            "_SEMICOLON_" => Self::Semicolon,
            "_COLON_" => Self::Colon,
            "_LPAREN_" => Self::LParen,
            "_RPAREN_" => Self::RParen,
            "_LBRACE_" => Self::LBrace,
            "_RBRACE_" => Self::RBrace,
            "_TIMES_" => Self::Times,
            "_PLUS_" => Self::Plus,
            "_MINUS_" => Self::Minus,
            "_ARROW_" => Self::Arrow,
            "_HASH_" => Self::Hash,
            "_EQUAL_" => Self::Equal,
            "_NOT_EQUAL_" => Self::NotEqual,
            "_LESS_" => Self::Less,
            "_GREATER_" => Self::Greater,
            "_LESS_EQUAL_" => Self::LessEqual,
            "_GREATER_EQUAL_" => Self::GreaterEqual,
            "_NOT_" => Self::Not,
            "_AND_" => Self::And,
            "_OR_" => Self::Or,
            "_IMPLIES_" => Self::Implies,
            "_IMPLIED_" => Self::Implied,
            "_IFF_" => Self::Iff,
            "_FORALL_" => Self::Forall,
            "_EXISTS_" => Self::Exists,
            "_VOCABULARY_" => Self::Vocabulary,
            "_THEORY_" => Self::Theory,
            "_TYPE_" => Self::Type,
            "_CONSTRUCTED_" => Self::Constructed,
            "_FROM_" => Self::From,
            "_IN_" => Self::In,
            "_TRUE_" => Self::True,
            "_FALSE_" => Self::False,
            "_NAME_" => Self::Name,
            "_NUMBER_" => Self::Number,
            _ => Self::Unknown,
        }
    }
}

impl ToString for TokenType {
    fn to_string(&self) -> String {
        match self {
            Self::Comma => "`,`",
            Self::Dot => "`.`",
            Self::Dots => "`..`",
            Self::Semicolon => "`;`",
            Self::Colon => "`:`",
            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Times => "`*`",
            Self::Plus => "`+`",
            Self::Minus => "`-`",
            Self::Arrow => "`->`",
            Self::Hash => "`#`",
            Self::Equal => "`=`",
            Self::NotEqual => "`~=`",
            Self::Less => "`<`",
            Self::Greater => "`>`",
            Self::LessEqual => "`=<`",
            Self::GreaterEqual => "`>=`",
            Self::Not => "`~`",
            Self::And => "`&`",
            Self::Or => "`|`",
            Self::Implies => "`=>`",
            Self::Implied => "`<=`",
            Self::Iff => "`<=>`",
            Self::Forall => "`!`",
            Self::Exists => "`?`",
            Self::Vocabulary => "`vocabulary`",
            Self::Theory => "`theory`",
            Self::Type => "`type`",
            Self::Constructed => "`constructed`",
            Self::From => "`from`",
            Self::In => "`in`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::Name => "`identifier`",
            Self::Number => "`number`",
            Self::Unknown => "`unknown token`",
        }
        .into()
    }
}

/// Is the type of errors returned by the parser.
#[derive(Error, PartialEq, Debug)]
pub enum Error {
    #[error("found `{found}` at {position}; expecting {}",
            Error::pretty_expected_tokens(&*.expected),
    )]
    UnrecognizedToken {
        position: Position,
        expected: Vec<TokenType>,
        found: String,
    },
    #[error("invalid token at {position}")]
    InvalidToken { position: Position },
    #[error("unexpected end of input at {position}; expecting {}",
            Error::pretty_expected_tokens(&*.expected)
    )]
    UnrecognizedEOF {
        position: Position,
        expected: Vec<TokenType>,
    },
    #[error("unexpected token `{found}` at {position}")]
    ExtraToken { position: Position, found: String },
    #[error("number `{found}` at {position} is out of range")]
    InvalidNumber { position: Position, found: String },
}

impl Error {
    fn pretty_expected_tokens(items: &[TokenType]) -> String {
        let strs = items.iter().map(ToString::to_string).collect::<Vec<_>>();
        match items.len() {
            0 => "".into(),
            1 => strs[0].to_string(),
            2 => format!("{} or {}", strs[0], strs[1]),
            n => format!("{}, or {}", strs[0..n - 1].join(", "), strs[n - 1]),
        }
    }

    /// Returns the position in the source where the error occurred.
    pub fn position(&self) -> Position {
        match self {
            Self::UnrecognizedToken { position, .. }
            | Self::InvalidToken { position }
            | Self::UnrecognizedEOF { position, .. }
            | Self::ExtraToken { position, .. }
            | Self::InvalidNumber { position, .. } => *position,
        }
    }
}

/// Stores source information to retrieve token positions in the source.
pub struct SourceInfo<'s> {
    lines: Vec<usize>,
    source: &'s str,
}

impl<'s> SourceInfo<'s> {
    pub fn new(source: &'s str) -> Self {
        let lines = source
            .bytes()
            .enumerate()
            .filter(|&(_, ch)| ch == b'\n')
            .map(|(i, _)| i + 1);
        Self {
            lines: std::iter::once(0).chain(lines).collect(),
            source,
        }
    }

    /// Returns the line and column of the byte offset `location`.
    pub fn position(&self, location: usize) -> Position {
        let line = self
            .lines
            .iter()
            .position(|l| location < *l)
            .unwrap_or_else(|| self.lines.len());
        let start = self.lines[line - 1];
        let column = self
            .source
            .get(start..location)
            .map(|s| s.chars().count())
            .unwrap_or(0)
            + 1;

        Position::new(line, column)
    }

    fn convert_error<T: ToString>(&self, error: ParseError<usize, T, Error>) -> Error {
        match error {
            ParseError::InvalidToken { location } => Error::InvalidToken {
                position: self.position(location),
            },
            ParseError::UnrecognizedEOF { location, expected } => Error::UnrecognizedEOF {
                position: self.position(location),
                expected: expected.into_iter().map(From::from).collect(),
            },
            ParseError::UnrecognizedToken { token, expected } => Error::UnrecognizedToken {
                position: self.position(token.0),
                expected: expected.into_iter().map(From::from).collect(),
                found: token.1.to_string(),
            },
            ParseError::ExtraToken { token } => Error::ExtraToken {
                position: self.position(token.0),
                found: token.1.to_string(),
            },
            ParseError::User { error } => error,
        }
    }
}

impl FromStr for KnowledgeBase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let info = SourceInfo::new(s);
        grammar::KnowledgeBaseParser::new()
            .parse(&info, s)
            .map_err(|e| info.convert_error(e))
    }
}

impl FromStr for Expr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let info = SourceInfo::new(s);
        grammar::ExprParser::new()
            .parse(&info, s)
            .map_err(|e| info.convert_error(e))
    }
}
